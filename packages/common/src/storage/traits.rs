use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::name::AssetName;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Named file storage for uploaded media.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store bytes under the given name and return the number of bytes written.
    async fn put(&self, name: &AssetName, data: &[u8]) -> Result<u64, StorageError> {
        let mut reader = Cursor::new(data.to_vec());
        self.put_stream(name, &mut reader).await
    }

    /// Store data from an async reader under the given name.
    ///
    /// Nothing is visible under `name` unless the whole stream was written.
    async fn put_stream(
        &self,
        name: &AssetName,
        reader: &mut (dyn AsyncRead + Unpin + Send),
    ) -> Result<u64, StorageError>;

    /// Retrieve all bytes of an asset.
    async fn get(&self, name: &AssetName) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(name).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Retrieve an asset as a streaming async reader.
    async fn get_stream(&self, name: &AssetName) -> Result<BoxReader, StorageError>;

    /// Delete an asset.
    ///
    /// Returns `true` if the asset was deleted, `false` if it did not exist.
    async fn delete(&self, name: &AssetName) -> Result<bool, StorageError>;

    /// Get the size of an asset in bytes.
    async fn size(&self, name: &AssetName) -> Result<u64, StorageError>;
}
