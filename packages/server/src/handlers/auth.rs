use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{RefreshRequest, SignInRequest, TokenPair, validate_sign_in_request};
use crate::repository::{session, user};
use crate::state::AppState;
use crate::utils::hash;

#[utoipa::path(
    post,
    path = "/v1/auth/sign-in",
    tag = "Auth",
    operation_id = "signIn",
    summary = "Sign in with email and password",
    description = "Verifies the credentials and opens a session: returns an access token and a refresh token. \
        The access token is only honoured while the session is alive.",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenPair),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong password (INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 404, description = "Unknown email (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignInRequest>,
) -> Result<Json<TokenPair>, AppError> {
    validate_sign_in_request(&payload)?;

    let user = user::find_by_email(&state.db, payload.email.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid email or password".into()))?;

    hash::verify_password(&payload.password, &user.password_hash)?;

    session::purge_expired(&state.db, user.id).await?;
    let pair = session::issue(&state.db, &user, &state.config.auth).await?;

    tracing::info!(user_id = user.id, "User signed in");
    Ok(Json(pair))
}

#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    tag = "Auth",
    operation_id = "refreshTokens",
    summary = "Exchange a refresh token for a new token pair",
    description = "Consumes the presented refresh token and returns a fresh access/refresh pair. \
        A refresh token can be used once.",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unknown or expired refresh token (TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshRequest>,
) -> Result<Json<TokenPair>, AppError> {
    if payload.refresh_token.is_empty() {
        return Err(AppError::Validation("refresh_token must not be empty".into()));
    }

    let pair = session::rotate(&state.db, &payload.refresh_token, &state.config.auth).await?;
    Ok(Json(pair))
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Auth",
    operation_id = "logout",
    summary = "End all sessions of the caller",
    description = "Deletes every refresh token of the caller. Access tokens issued earlier stop working immediately.",
    responses(
        (status = 204, description = "Signed out"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn logout(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let revoked = session::revoke_all(&state.db, auth_user.user_id).await?;
    tracing::info!(revoked, "User signed out");
    Ok(StatusCode::NO_CONTENT)
}
