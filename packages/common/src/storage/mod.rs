mod error;
mod name;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use name::AssetName;
pub use traits::{AssetStore, BoxReader};
