use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};

use super::error::StorageError;
use super::name::AssetName;
use super::traits::{AssetStore, BoxReader};

/// Filesystem-backed asset store.
///
/// Assets live flat under `{base_path}/{name}`. Writes go to
/// `{base_path}/.tmp` first and are renamed into place once complete.
pub struct FilesystemAssetStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemAssetStore {
    /// Create a new filesystem asset store, creating its directories.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    fn asset_path(&self, name: &AssetName) -> PathBuf {
        self.base_path.join(name.as_str())
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl AssetStore for FilesystemAssetStore {
    async fn put_stream(
        &self,
        name: &AssetName,
        reader: &mut (dyn AsyncRead + Unpin + Send),
    ) -> Result<u64, StorageError> {
        let temp_path = self.temp_path();
        let mut total_bytes: u64 = 0;

        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer
        let mut temp_file = fs::File::create(&temp_path).await?;

        let copied: Result<(), StorageError> = async {
            loop {
                let n = reader.read(&mut buf).await?;
                if n == 0 {
                    break;
                }

                total_bytes += n as u64;
                if total_bytes > self.max_size {
                    return Err(StorageError::SizeLimitExceeded {
                        actual: total_bytes,
                        limit: self.max_size,
                    });
                }

                temp_file.write_all(&buf[..n]).await?;
            }
            temp_file.flush().await?;
            Ok(())
        }
        .await;

        drop(temp_file);

        if let Err(e) = copied {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        if let Err(e) = fs::rename(&temp_path, self.asset_path(name)).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(total_bytes)
    }

    async fn get_stream(&self, name: &AssetName) -> Result<BoxReader, StorageError> {
        match fs::File::open(self.asset_path(name)).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, name: &AssetName) -> Result<bool, StorageError> {
        match fs::remove_file(self.asset_path(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, name: &AssetName) -> Result<u64, StorageError> {
        match fs::metadata(self.asset_path(name)).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
