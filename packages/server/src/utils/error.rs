use thiserror::Error;

/// Credential and token failures, before they are mapped to HTTP responses.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header is not `Bearer <token>`")]
    MalformedHeader,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token issuer does not match")]
    IssuerMismatch,
    #[error("token is invalid: {0}")]
    InvalidToken(String),
    #[error("password does not match")]
    PasswordMismatch,
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("token signing failed: {0}")]
    Signing(String),
    #[error("entropy source failed: {0}")]
    Entropy(String),
}
