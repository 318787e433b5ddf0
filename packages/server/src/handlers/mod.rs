pub mod age_category;
pub mod asset;
pub mod auth;
pub mod genre;
pub mod health;
pub mod image;
pub mod project;
pub mod project_type;
pub mod role;
pub mod user;
pub mod video;
