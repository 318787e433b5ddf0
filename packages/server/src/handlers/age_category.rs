use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{age_category, project_age_category};
use crate::error::{AppError, ErrorBody, conflict_on_unique};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::lookup::{LookupRequest, LookupResponse};
use crate::models::shared::{IdResponse, validate_title};
use crate::state::AppState;

const DUPLICATE: &str = "An age category with this title already exists";

#[utoipa::path(
    get,
    path = "/v1/age-categories",
    tag = "Age Categories",
    operation_id = "listAgeCategories",
    summary = "List age categories",
    description = "Returns every age category ordered by id. Requires read access to age categories.",
    responses(
        (status = 200, description = "Age categories", body = Vec<LookupResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state))]
pub async fn list_age_categories(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<LookupResponse>>, AppError> {
    let categories = age_category::Entity::find()
        .order_by_asc(age_category::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/v1/age-categories/{id}",
    tag = "Age Categories",
    operation_id = "getAgeCategory",
    summary = "Get an age category",
    params(("id" = i32, Path, description = "Age category ID")),
    responses(
        (status = 200, description = "Age category", body = LookupResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Age category not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state), fields(age_category_id = id))]
pub async fn get_age_category(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LookupResponse>, AppError> {
    let category = find_age_category(&state.db, id).await?;
    Ok(Json(category.into()))
}

#[utoipa::path(
    post,
    path = "/v1/age-categories",
    tag = "Age Categories",
    operation_id = "createAgeCategory",
    summary = "Create an age category",
    request_body = LookupRequest,
    responses(
        (status = 201, description = "Age category created", body = IdResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Duplicate title (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user, state, payload), fields(user_id = auth_user.user_id))]
pub async fn create_age_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<LookupRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_title(&payload.title, "Title")?;

    let model = age_category::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| conflict_on_unique(e, DUPLICATE))?;

    tracing::info!(age_category_id = model.id, "Age category created");
    Ok((StatusCode::CREATED, Json(IdResponse { id: model.id })))
}

#[utoipa::path(
    put,
    path = "/v1/age-categories/{id}",
    tag = "Age Categories",
    operation_id = "updateAgeCategory",
    summary = "Rename an age category",
    params(("id" = i32, Path, description = "Age category ID")),
    request_body = LookupRequest,
    responses(
        (status = 200, description = "Age category updated", body = LookupResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Age category not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Duplicate title (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state, payload), fields(age_category_id = id))]
pub async fn update_age_category(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<LookupRequest>,
) -> Result<Json<LookupResponse>, AppError> {
    validate_title(&payload.title, "Title")?;

    let mut active: age_category::ActiveModel = find_age_category(&state.db, id).await?.into();
    active.title = Set(payload.title.trim().to_string());
    let model = active
        .update(&state.db)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE))?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/age-categories/{id}",
    tag = "Age Categories",
    operation_id = "deleteAgeCategory",
    summary = "Delete an age category",
    description = "Deletes the age category and detaches it from every project.",
    params(("id" = i32, Path, description = "Age category ID")),
    responses(
        (status = 204, description = "Age category deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Age category not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state), fields(age_category_id = id))]
pub async fn delete_age_category(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_age_category(&txn, id).await?;

    project_age_category::Entity::delete_many()
        .filter(project_age_category::Column::AgeCategoryId.eq(id))
        .exec(&txn)
        .await?;
    age_category::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_age_category<C: ConnectionTrait>(db: &C, id: i32) -> Result<age_category::Model, AppError> {
    age_category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Age category not found".into()))
}
