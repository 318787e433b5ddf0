use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::entity::role;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::role::RoleResponse;
use crate::models::shared::{IdResponse, normalize_ids};
use crate::models::user::*;
use crate::repository::user::{self as users, ProfileWrite};
use crate::state::AppState;
use crate::utils::hash;

#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "Users",
    operation_id = "registerUser",
    summary = "Register a new account",
    description = "Creates a user holding the default `user` role. Registration does not sign the user in.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = IdResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Email already registered (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let password_hash = hash::hash_password(&payload.password)?;
    let user = users::create_user(
        &state.db,
        payload.name.trim(),
        payload.email.trim(),
        password_hash,
        role::DEFAULT_ROLE,
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(IdResponse { id: user.id })))
}

#[utoipa::path(
    get,
    path = "/v1/users/profile",
    tag = "Users",
    operation_id = "getProfile",
    summary = "Get the caller's profile",
    responses(
        (status = 200, description = "Own profile with roles", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 404, description = "User no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user, state), fields(user_id = auth_user.user_id))]
pub async fn get_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let user = users::find_user(&state.db, auth_user.user_id).await?;
    Ok(Json(UserResponse::new(user, role_views(auth_user.roles))))
}

#[utoipa::path(
    put,
    path = "/v1/users/profile",
    tag = "Users",
    operation_id = "updateProfile",
    summary = "Update the caller's profile",
    description = "Overwrites name, email, date of birth and phone. \
        Access tokens name the email they were issued for, so changing it requires signing in again.",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Email already registered (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user, state, payload), fields(user_id = auth_user.user_id))]
pub async fn update_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    validate_update_profile_request(&payload)?;

    let profile = ProfileWrite {
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_string(),
        date_of_birth: payload.date_of_birth,
        phone: trimmed(payload.phone),
    };
    let user = users::update_profile(&state.db, auth_user.user_id, &profile).await?;

    Ok(Json(UserResponse::new(user, role_views(auth_user.roles))))
}

#[utoipa::path(
    put,
    path = "/v1/users/profile/password",
    tag = "Users",
    operation_id = "changePassword",
    summary = "Change the caller's password",
    description = "Verifies the current password, stores the new one and ends every session of the caller.",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed, sign in again"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized or wrong current password (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user, state, payload), fields(user_id = auth_user.user_id))]
pub async fn change_password(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_change_password_request(&payload)?;

    let user = users::find_user(&state.db, auth_user.user_id).await?;
    hash::verify_password(&payload.current_password, &user.password_hash)?;

    let password_hash = hash::hash_password(&payload.new_password)?;
    users::change_password(&state.db, user.id, password_hash).await?;

    tracing::info!("Password changed, sessions revoked");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/v1/users/profile",
    tag = "Users",
    operation_id = "deleteProfile",
    summary = "Delete the caller's account",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user, state), fields(user_id = auth_user.user_id))]
pub async fn delete_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    users::delete_user(&state.db, auth_user.user_id).await?;
    tracing::info!("Account deleted by owner");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List users",
    responses(
        (status = 200, description = "Users with their roles", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state))]
pub async fn list_users(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let rows = users::list_with_roles(&state.db).await?;
    Ok(Json(
        rows.into_iter()
            .map(|(user, roles)| UserResponse::new(user, role_views(roles)))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Get a user",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User with roles", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state), fields(target_user_id = id))]
pub async fn get_user(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AppError> {
    let user = users::find_user(&state.db, id).await?;
    let roles = users::roles_of(&state.db, id).await?;
    Ok(Json(UserResponse::new(user, role_views(roles))))
}

#[utoipa::path(
    put,
    path = "/v1/users/{id}",
    tag = "Users",
    operation_id = "updateUser",
    summary = "Update a user and replace their roles",
    description = "Overwrites the profile fields and replaces the role set with `role_ids` in one transaction.",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error or unknown role (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Email already registered (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user, state, payload), fields(user_id = auth_user.user_id, target_user_id = id))]
pub async fn update_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    validate_update_user_request(&payload)?;
    let role_ids = normalize_ids(&payload.role_ids, "role_ids")?;

    let profile = ProfileWrite {
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_string(),
        date_of_birth: payload.date_of_birth,
        phone: trimmed(payload.phone),
    };
    let user = users::update_user(&state.db, id, &profile, &role_ids).await?;
    let roles = users::roles_of(&state.db, id).await?;

    tracing::info!(role_count = roles.len(), "User updated");
    Ok(Json(UserResponse::new(user, role_views(roles))))
}

#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    tag = "Users",
    operation_id = "deleteUser",
    summary = "Delete a user",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user, state), fields(user_id = auth_user.user_id, target_user_id = id))]
pub async fn delete_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    users::delete_user(&state.db, id).await?;
    tracing::info!("User deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn role_views(roles: Vec<role::Model>) -> Vec<RoleResponse> {
    roles.into_iter().map(Into::into).collect()
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
