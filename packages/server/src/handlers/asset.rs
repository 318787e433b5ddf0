//! Multipart intake and streamed delivery shared by the image, video and
//! cover endpoints.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Multipart};
use axum::http::header;
use axum::response::Response;
use common::storage::{AssetName, AssetStore};
use futures::TryStreamExt;
use tokio_util::io::{ReaderStream, StreamReader};

use crate::error::AppError;
use crate::utils::media::{MediaKind, content_type_for};

/// Room for multipart boundaries and the small text fields.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Body limit layer for an upload route whose file may be `max_file` bytes.
pub fn upload_body_limit(max_file: u64) -> DefaultBodyLimit {
    let max_file = usize::try_from(max_file).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(max_file.saturating_add(MULTIPART_OVERHEAD))
}

/// A file already written to its store plus the text fields sent with it.
pub struct Upload {
    pub name: AssetName,
    fields: HashMap<String, String>,
    store: Arc<dyn AssetStore>,
}

impl Upload {
    /// Parse an optional text field.
    pub fn field<T: FromStr>(&self, key: &str) -> Result<Option<T>, AppError> {
        self.fields
            .get(key)
            .map(|raw| {
                raw.trim()
                    .parse()
                    .map_err(|_| AppError::Validation(format!("{key} is not valid: {raw:?}")))
            })
            .transpose()
    }

    /// Parse a text field that must be present.
    pub fn required<T: FromStr>(&self, key: &str) -> Result<T, AppError> {
        self.field(key)?
            .ok_or_else(|| AppError::Validation(format!("{key} is required")))
    }

    /// Finish the upload with the outcome of the database step. On failure
    /// the stored file is removed so no file outlives its rejected row.
    pub async fn settle<T>(self, outcome: Result<T, AppError>) -> Result<T, AppError> {
        if outcome.is_err() {
            discard(self.store.as_ref(), &self.name).await;
        }
        outcome
    }
}

/// Read a multipart body, streaming the `kind` file part into `store`.
///
/// Exactly one file part is accepted. Text parts are kept for the caller.
pub async fn receive(
    multipart: &mut Multipart,
    kind: MediaKind,
    store: &Arc<dyn AssetStore>,
) -> Result<Upload, AppError> {
    let mut stored: Option<AssetName> = None;
    let mut fields = HashMap::new();

    let outcome: Result<(), AppError> = async {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
        {
            let Some(field_name) = field.name().map(str::to_string) else {
                continue;
            };

            if field_name != kind.field_name() {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read {field_name}: {e}")))?;
                fields.insert(field_name, value);
                continue;
            }

            if stored.is_some() {
                return Err(AppError::Validation(format!(
                    "Only one {} may be uploaded per request",
                    kind.field_name()
                )));
            }

            let extension = kind
                .extension_for(field.content_type(), field.file_name())
                .map_err(|e| AppError::Validation(e.message(kind)))?;
            let name = AssetName::generate(extension)?;

            let reader = StreamReader::new(field.map_err(std::io::Error::other));
            let mut reader = std::pin::pin!(reader);
            let bytes = store.put_stream(&name, &mut reader).await?;

            tracing::debug!(asset = %name, bytes, "Stored upload");
            stored = Some(name);
        }
        Ok(())
    }
    .await;

    if let Err(e) = outcome {
        if let Some(name) = &stored {
            discard(store.as_ref(), name).await;
        }
        return Err(e);
    }

    let name = stored.ok_or_else(|| {
        AppError::Validation(format!("Missing '{}' file field", kind.field_name()))
    })?;

    Ok(Upload {
        name,
        fields,
        store: Arc::clone(store),
    })
}

/// Validate a client-supplied asset id for `kind`.
pub fn parse_asset_id(kind: MediaKind, id: &str) -> Result<AssetName, AppError> {
    let name = AssetName::parse(id)?;
    if !kind.extensions().contains(&name.extension()) {
        return Err(AppError::Validation(format!(
            "Invalid {} id: {id}",
            kind.field_name()
        )));
    }
    Ok(name)
}

#[derive(Debug, Clone, Copy)]
pub enum Disposition {
    Attachment,
    Inline,
}

impl Disposition {
    fn as_str(self) -> &'static str {
        match self {
            Self::Attachment => "attachment",
            Self::Inline => "inline",
        }
    }
}

/// Stream a stored asset back without buffering it.
pub async fn serve(
    store: &dyn AssetStore,
    name: &AssetName,
    disposition: Disposition,
) -> Result<Response, AppError> {
    let size = store.size(name).await?;
    let reader = store.get_stream(name).await?;

    Response::builder()
        .header(header::CONTENT_TYPE, content_type_for(name))
        .header(header::CONTENT_LENGTH, size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("{}; filename=\"{name}\"", disposition.as_str()),
        )
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Best-effort removal of a stored file. Failure only leaves an
/// unreferenced file behind, so it is logged rather than returned.
pub async fn discard(store: &dyn AssetStore, name: &AssetName) {
    match store.delete(name).await {
        Ok(true) => {}
        Ok(false) => tracing::warn!(asset = %name, "Asset file was already missing"),
        Err(e) => tracing::warn!(asset = %name, error = %e, "Failed to remove asset file"),
    }
}
