pub mod bearer;
pub mod error;
pub mod hash;
pub mod jwt;
pub mod media;
pub mod refresh;

pub use error::AuthError;
