use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{genre, project_genre};
use crate::error::{AppError, ErrorBody, conflict_on_unique};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::lookup::{LookupRequest, LookupResponse};
use crate::models::shared::{IdResponse, validate_title};
use crate::state::AppState;

const DUPLICATE: &str = "A genre with this title already exists";

#[utoipa::path(
    get,
    path = "/v1/genres",
    tag = "Genres",
    operation_id = "listGenres",
    summary = "List genres",
    description = "Returns every genre ordered by id. Requires read access to genres.",
    responses(
        (status = 200, description = "Genres", body = Vec<LookupResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state))]
pub async fn list_genres(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<LookupResponse>>, AppError> {
    let genres = genre::Entity::find()
        .order_by_asc(genre::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(genres.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/v1/genres/{id}",
    tag = "Genres",
    operation_id = "getGenre",
    summary = "Get a genre",
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre", body = LookupResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Genre not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state), fields(genre_id = id))]
pub async fn get_genre(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LookupResponse>, AppError> {
    let genre = find_genre(&state.db, id).await?;
    Ok(Json(genre.into()))
}

#[utoipa::path(
    post,
    path = "/v1/genres",
    tag = "Genres",
    operation_id = "createGenre",
    summary = "Create a genre",
    request_body = LookupRequest,
    responses(
        (status = 201, description = "Genre created", body = IdResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Duplicate title (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user, state, payload), fields(user_id = auth_user.user_id))]
pub async fn create_genre(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<LookupRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_title(&payload.title, "Title")?;

    let model = genre::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| conflict_on_unique(e, DUPLICATE))?;

    tracing::info!(genre_id = model.id, "Genre created");
    Ok((StatusCode::CREATED, Json(IdResponse { id: model.id })))
}

#[utoipa::path(
    put,
    path = "/v1/genres/{id}",
    tag = "Genres",
    operation_id = "updateGenre",
    summary = "Rename a genre",
    params(("id" = i32, Path, description = "Genre ID")),
    request_body = LookupRequest,
    responses(
        (status = 200, description = "Genre updated", body = LookupResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Genre not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Duplicate title (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state, payload), fields(genre_id = id))]
pub async fn update_genre(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<LookupRequest>,
) -> Result<Json<LookupResponse>, AppError> {
    validate_title(&payload.title, "Title")?;

    let mut active: genre::ActiveModel = find_genre(&state.db, id).await?.into();
    active.title = Set(payload.title.trim().to_string());
    let model = active
        .update(&state.db)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE))?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/genres/{id}",
    tag = "Genres",
    operation_id = "deleteGenre",
    summary = "Delete a genre",
    description = "Deletes the genre and detaches it from every project.",
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Genre not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state), fields(genre_id = id))]
pub async fn delete_genre(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_genre(&txn, id).await?;

    project_genre::Entity::delete_many()
        .filter(project_genre::Column::GenreId.eq(id))
        .exec(&txn)
        .await?;
    genre::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_genre<C: ConnectionTrait>(db: &C, id: i32) -> Result<genre::Model, AppError> {
    genre::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Genre not found".into()))
}
