use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};

use crate::entity::role;
use crate::error::AppError;
use crate::repository::{session, user};
use crate::state::AppState;
use crate::utils::{bearer::bearer_token, jwt};

/// Authenticated identity with its roles.
///
/// Routes listed in the permission table are authenticated by
/// [`crate::permission::enforce`], which stores the identity in the request
/// extensions; this extractor reuses it. Other routes that take an
/// `AuthUser` run the same pipeline here.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub roles: Vec<role::Model>,
}

/// Resolve the caller from the `Authorization: Bearer <token>` header.
///
/// Order: header shape, token signature/expiry/issuer, user by email (which
/// must be the user the token was issued to), roles, then a live
/// refresh-token row. A valid access token alone is not enough.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, AppError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::TokenMissing)?
        .to_str()
        .map_err(|_| AppError::TokenInvalid)?;

    let token = bearer_token(header)?;
    let claims = jwt::verify(token, &state.config.auth.jwt_secret)?;

    let user = user::find_by_email(&state.db, &claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    if user.id != claims.uid {
        tracing::debug!(
            user_id = user.id,
            token_uid = claims.uid,
            "Access token was issued to an earlier owner of this email"
        );
        return Err(AppError::TokenInvalid);
    }
    let roles = user::roles_of(&state.db, user.id).await?;

    if !session::has_live_session(&state.db, user.id).await? {
        tracing::debug!(user_id = user.id, "Access token presented without a live session");
        return Err(AppError::SessionNotFound);
    }

    Ok(AuthUser {
        user_id: user.id,
        email: user.email,
        roles,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }
        authenticate(state, &parts.headers).await
    }
}
