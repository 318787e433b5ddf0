pub mod age_category;
pub mod genre;
pub mod image;
pub mod project;
pub mod project_age_category;
pub mod project_genre;
pub mod project_type;
pub mod refresh_token;
pub mod role;
pub mod user;
pub mod user_role;
pub mod video;
