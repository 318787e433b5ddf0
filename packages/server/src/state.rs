use std::sync::Arc;

use common::storage::AssetStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub images: Arc<dyn AssetStore>,
    pub videos: Arc<dyn AssetStore>,
}
