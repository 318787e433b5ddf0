use rand::TryRngCore;
use rand::rngs::OsRng;

use super::AuthError;

/// Generate an opaque refresh token: 32 random bytes, hex-encoded.
pub fn make_refresh_token() -> Result<String, AuthError> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::Entropy(e.to_string()))?;
    Ok(hex::encode(bytes))
}
