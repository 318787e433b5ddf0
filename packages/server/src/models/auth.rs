use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for signing in.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SignInRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_sign_in_request(payload: &SignInRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Request body for exchanging a refresh token.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RefreshRequest {
    /// Refresh token returned by sign-in or a previous refresh.
    #[schema(example = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08")]
    pub refresh_token: String,
}

/// Access/refresh token pair.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TokenPair {
    /// HS256 JWT, valid for 24 hours by default.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Opaque session token, valid for 60 days by default.
    #[schema(example = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08")]
    pub refresh_token: String,
}
