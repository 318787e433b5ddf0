use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Deployment flavour. `dev` turns on SQL statement logging and verbose
/// crate-level tracing.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Dev,
    Hosted,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub images_dir: PathBuf,
    pub videos_dir: PathBuf,
    /// Maximum image upload in bytes.
    pub max_image_size: u64,
    /// Maximum video upload in bytes.
    pub max_video_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    /// Bootstrap administrator, created on startup when both are set.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub platform: Platform,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite://ozinshe.db?mode=rwc")?
            .set_default("platform", "dev")?
            .set_default("storage.images_dir", "./images")?
            .set_default("storage.videos_dir", "./videos")?
            .set_default("storage.max_image_size", 10 * 1024 * 1024)?
            .set_default("storage.max_video_size", 64 * 1024 * 1024)?
            .set_default("auth.access_token_ttl_secs", 24 * 60 * 60)?
            .set_default("auth.refresh_token_ttl_secs", 60 * 24 * 60 * 60)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., OZINSHE__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("OZINSHE").separator("__"))
            // Plain deployment variables win over everything else.
            .set_override_option("server.port", env_var("PORT"))?
            .set_override_option("database.url", env_var("DATABASE_URL"))?
            .set_override_option("platform", env_var("PLATFORM"))?
            .set_override_option("storage.images_dir", env_var("DIR_IMAGES"))?
            .set_override_option("storage.videos_dir", env_var("DIR_VIDEOS"))?
            .set_override_option("auth.jwt_secret", env_var("JWT_SECRET"))?
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Message("auth.jwt_secret must not be empty".into()));
        }
        if self.auth.access_token_ttl_secs <= 0 || self.auth.refresh_token_ttl_secs <= 0 {
            return Err(ConfigError::Message("token lifetimes must be positive".into()));
        }
        Ok(())
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
