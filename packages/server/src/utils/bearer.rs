use super::AuthError;

const SCHEME: &str = "Bearer ";

/// Extract the raw token from an `Authorization` header value.
pub fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let token = header
        .strip_prefix(SCHEME)
        .ok_or(AuthError::MalformedHeader)?;

    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}
