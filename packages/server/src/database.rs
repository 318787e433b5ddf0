use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::config::Platform;

pub async fn init_db(db_url: &str, platform: Platform) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(32)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(30 * 60))
        .sqlx_logging(platform == Platform::Dev);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("ozinshe_server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}
