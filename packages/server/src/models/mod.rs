pub mod asset;
pub mod auth;
pub mod lookup;
pub mod project;
pub mod role;
pub mod shared;
pub mod user;
