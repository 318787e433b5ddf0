use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{project, project_type};
use crate::error::{AppError, ErrorBody, conflict_on_unique};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::lookup::{LookupRequest, LookupResponse};
use crate::models::shared::{IdResponse, validate_title};
use crate::state::AppState;

const DUPLICATE: &str = "A type with this title already exists";

#[utoipa::path(
    get,
    path = "/v1/types",
    tag = "Types",
    operation_id = "listTypes",
    summary = "List project types",
    description = "Returns every project type ordered by id. Requires read access to types.",
    responses(
        (status = 200, description = "Types", body = Vec<LookupResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state))]
pub async fn list_types(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<LookupResponse>>, AppError> {
    let types = project_type::Entity::find()
        .order_by_asc(project_type::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(types.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/v1/types/{id}",
    tag = "Types",
    operation_id = "getType",
    summary = "Get a project type",
    params(("id" = i32, Path, description = "Type ID")),
    responses(
        (status = 200, description = "Type", body = LookupResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Type not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state), fields(type_id = id))]
pub async fn get_type(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LookupResponse>, AppError> {
    let project_type = find_type(&state.db, id).await?;
    Ok(Json(project_type.into()))
}

#[utoipa::path(
    post,
    path = "/v1/types",
    tag = "Types",
    operation_id = "createType",
    summary = "Create a project type",
    request_body = LookupRequest,
    responses(
        (status = 201, description = "Type created", body = IdResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Duplicate title (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user, state, payload), fields(user_id = auth_user.user_id))]
pub async fn create_type(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<LookupRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_title(&payload.title, "Title")?;

    let model = project_type::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| conflict_on_unique(e, DUPLICATE))?;

    tracing::info!(type_id = model.id, "Type created");
    Ok((StatusCode::CREATED, Json(IdResponse { id: model.id })))
}

#[utoipa::path(
    put,
    path = "/v1/types/{id}",
    tag = "Types",
    operation_id = "updateType",
    summary = "Rename a project type",
    params(("id" = i32, Path, description = "Type ID")),
    request_body = LookupRequest,
    responses(
        (status = 200, description = "Type updated", body = LookupResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Type not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Duplicate title (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state, payload), fields(type_id = id))]
pub async fn update_type(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<LookupRequest>,
) -> Result<Json<LookupResponse>, AppError> {
    validate_title(&payload.title, "Title")?;

    let mut active: project_type::ActiveModel = find_type(&state.db, id).await?.into();
    active.title = Set(payload.title.trim().to_string());
    let model = active
        .update(&state.db)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE))?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/types/{id}",
    tag = "Types",
    operation_id = "deleteType",
    summary = "Delete a project type",
    description = "Deletes the type. Fails while any project still uses it.",
    params(("id" = i32, Path, description = "Type ID")),
    responses(
        (status = 204, description = "Type deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Type not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Type is in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state), fields(type_id = id))]
pub async fn delete_type(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_type(&txn, id).await?;

    let in_use = project::Entity::find()
        .filter(project::Column::TypeId.eq(id))
        .count(&txn)
        .await?;
    if in_use > 0 {
        return Err(AppError::Conflict(format!(
            "Type is used by {in_use} project(s)"
        )));
    }

    project_type::Entity::delete_by_id(id)
        .exec(&txn)
        .await
        .map_err(in_use_conflict)?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// A project inserted after the count still trips the foreign key.
fn in_use_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::Conflict("Type is used by a project".into())
        }
        _ => AppError::from(err),
    }
}

async fn find_type<C: ConnectionTrait>(db: &C, id: i32) -> Result<project_type::Model, AppError> {
    project_type::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Type not found".into()))
}
