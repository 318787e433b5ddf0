use std::fmt;

use uuid::Uuid;

use super::error::StorageError;

/// A generated asset file name of the form `<uuid>.<ext>`.
///
/// Names are only ever produced by [`AssetName::generate`] or accepted
/// through [`AssetName::parse`], so they can be joined onto a storage
/// directory without path traversal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssetName(String);

impl AssetName {
    /// Generate a fresh random name with the given extension.
    pub fn generate(extension: &str) -> Result<Self, StorageError> {
        validate_extension(extension)?;
        Ok(Self(format!("{}.{}", Uuid::new_v4(), extension)))
    }

    /// Validate a client-supplied asset id.
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        let (stem, extension) = s
            .rsplit_once('.')
            .ok_or_else(|| StorageError::InvalidName(format!("missing extension: {s}")))?;

        let uuid = Uuid::parse_str(stem)
            .map_err(|_| StorageError::InvalidName(format!("not a generated name: {s}")))?;
        validate_extension(extension)?;

        // Canonical hyphenated form only, so one file has exactly one name.
        let canonical = format!("{uuid}.{extension}");
        if canonical != s {
            return Err(StorageError::InvalidName(format!("not a generated name: {s}")));
        }

        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The extension without the leading dot.
    pub fn extension(&self) -> &str {
        self.0.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default()
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_extension(extension: &str) -> Result<(), StorageError> {
    if extension.is_empty()
        || extension.len() > 8
        || !extension.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err(StorageError::InvalidName(format!(
            "invalid extension: {extension:?}"
        )));
    }
    Ok(())
}
