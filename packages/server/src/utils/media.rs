use common::storage::AssetName;

/// The two kinds of uploadable media, each with its own accepted types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug)]
pub enum MediaError {
    /// Neither the part's content type nor its file name identify a type.
    Unknown,
    /// The type was identified but is not accepted for this kind.
    Unsupported(String),
}

impl MediaError {
    pub fn message(&self, kind: MediaKind) -> String {
        match self {
            Self::Unknown => format!("Could not determine the {} type", kind.field_name()),
            Self::Unsupported(mime) => format!(
                "Unsupported {} type '{mime}', expected one of: {}",
                kind.field_name(),
                kind.accepted().join(", ")
            ),
        }
    }
}

impl MediaKind {
    /// Multipart field carrying the file.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    /// Extensions a stored asset of this kind may carry.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Image => &["jpeg", "png"],
            Self::Video => &["mp4"],
        }
    }

    fn accepted(self) -> &'static [&'static str] {
        match self {
            Self::Image => &["image/jpeg", "image/png"],
            Self::Video => &["video/mp4"],
        }
    }

    /// Pick the stored file extension for an uploaded part.
    ///
    /// The declared content type wins; the file name is only consulted when
    /// the client sent no type or a generic one.
    pub fn extension_for(
        self,
        content_type: Option<&str>,
        file_name: Option<&str>,
    ) -> Result<&'static str, MediaError> {
        let declared = content_type
            .map(essence)
            .filter(|m| !m.is_empty() && m != "application/octet-stream");

        let mime = match declared {
            Some(m) => m,
            None => file_name
                .and_then(|name| mime_guess::from_path(name).first())
                .map(|m| m.essence_str().to_string())
                .ok_or(MediaError::Unknown)?,
        };

        match (self, mime.as_str()) {
            (Self::Image, "image/jpeg") => Ok("jpeg"),
            (Self::Image, "image/png") => Ok("png"),
            (Self::Video, "video/mp4") => Ok("mp4"),
            _ => Err(MediaError::Unsupported(mime)),
        }
    }
}

/// `Content-Type` to serve a stored asset with.
pub fn content_type_for(name: &AssetName) -> String {
    mime_guess::from_ext(name.extension())
        .first_or_octet_stream()
        .to_string()
}

fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
