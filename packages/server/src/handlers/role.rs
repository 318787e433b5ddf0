use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{role, user_role};
use crate::error::{AppError, ErrorBody, conflict_on_unique};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::role::{RoleRequest, RoleResponse, validate_role_request};
use crate::models::shared::IdResponse;
use crate::state::AppState;

const DUPLICATE: &str = "A role with this title already exists";

#[utoipa::path(
    get,
    path = "/v1/roles",
    tag = "Roles",
    operation_id = "listRoles",
    summary = "List roles",
    responses(
        (status = 200, description = "Roles with their levels", body = Vec<RoleResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state))]
pub async fn list_roles(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<RoleResponse>>, AppError> {
    let roles = role::Entity::find()
        .order_by_asc(role::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(roles.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/v1/roles/{id}",
    tag = "Roles",
    operation_id = "getRole",
    summary = "Get a role",
    params(("id" = i32, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role", body = RoleResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Role not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state), fields(role_id = id))]
pub async fn get_role(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RoleResponse>, AppError> {
    Ok(Json(find_role(&state.db, id).await?.into()))
}

#[utoipa::path(
    post,
    path = "/v1/roles",
    tag = "Roles",
    operation_id = "createRole",
    summary = "Create a role",
    description = "Creates a role with one level (0-3) per resource family. \
        Level 2 or more grants read access, level 3 grants writes.",
    request_body = RoleRequest,
    responses(
        (status = 201, description = "Role created", body = IdResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Duplicate title (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user, state, payload), fields(user_id = auth_user.user_id, title = %payload.title))]
pub async fn create_role(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_role_request(&payload)?;

    let model = role::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        projects: Set(payload.projects),
        genres: Set(payload.genres),
        age_categories: Set(payload.age_categories),
        types: Set(payload.types),
        users: Set(payload.users),
        roles: Set(payload.roles),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| conflict_on_unique(e, DUPLICATE))?;

    tracing::info!(role_id = model.id, "Role created");
    Ok((StatusCode::CREATED, Json(IdResponse { id: model.id })))
}

#[utoipa::path(
    put,
    path = "/v1/roles/{id}",
    tag = "Roles",
    operation_id = "updateRole",
    summary = "Replace a role",
    description = "Overwrites the title and every level. Takes effect on the members' next request.",
    params(("id" = i32, Path, description = "Role ID")),
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Role updated", body = RoleResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Role not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Duplicate title (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state, payload), fields(role_id = id))]
pub async fn update_role(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<RoleRequest>,
) -> Result<Json<RoleResponse>, AppError> {
    validate_role_request(&payload)?;

    let existing = find_role(&state.db, id).await?;
    let title = payload.title.trim().to_string();
    if is_builtin(&existing.title) && title != existing.title {
        return Err(AppError::Conflict("Built-in roles cannot be renamed".into()));
    }

    let mut active: role::ActiveModel = existing.into();
    active.title = Set(title);
    active.projects = Set(payload.projects);
    active.genres = Set(payload.genres);
    active.age_categories = Set(payload.age_categories);
    active.types = Set(payload.types);
    active.users = Set(payload.users);
    active.roles = Set(payload.roles);

    let model = active
        .update(&state.db)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE))?;

    tracing::info!("Role updated");
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/roles/{id}",
    tag = "Roles",
    operation_id = "deleteRole",
    summary = "Delete a role",
    description = "Deletes the role and removes it from every member. The built-in `admin` and `user` roles cannot be deleted.",
    params(("id" = i32, Path, description = "Role ID")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Role not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Built-in role (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state), fields(role_id = id))]
pub async fn delete_role(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_role(&txn, id).await?;
    if is_builtin(&existing.title) {
        return Err(AppError::Conflict(format!(
            "Built-in role '{}' cannot be deleted",
            existing.title
        )));
    }

    let memberships = user_role::Entity::delete_many()
        .filter(user_role::Column::RoleId.eq(id))
        .exec(&txn)
        .await?;
    role::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(memberships = memberships.rows_affected, "Role deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn is_builtin(title: &str) -> bool {
    title == role::ADMIN_ROLE || title == role::DEFAULT_ROLE
}

async fn find_role<C: ConnectionTrait>(db: &C, id: i32) -> Result<role::Model, AppError> {
    role::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Role not found".into()))
}
