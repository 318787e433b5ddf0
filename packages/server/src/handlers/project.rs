use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::handlers::asset;
use crate::models::asset::ImageResponse;
use crate::models::project::{ProjectRequest, ProjectResponse, SearchQuery, SetCoverRequest};
use crate::models::shared::{IdResponse, normalize_ids};
use crate::repository::{asset as assets, project as projects};
use crate::state::AppState;
use crate::utils::media::MediaKind;

#[utoipa::path(
    get,
    path = "/v1/projects",
    tag = "Projects",
    operation_id = "listProjects",
    summary = "List projects",
    description = "Returns every project with its type, cover, genres, age categories, images and videos.",
    responses(
        (status = 200, description = "Projects", body = Vec<ProjectResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state))]
pub async fn list_projects(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, AppError> {
    Ok(Json(projects::list_projects(&state.db).await?))
}

#[utoipa::path(
    get,
    path = "/v1/projects/{id}",
    tag = "Projects",
    operation_id = "getProject",
    summary = "Get a project",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project", body = ProjectResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state), fields(project_id = id))]
pub async fn get_project(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProjectResponse>, AppError> {
    Ok(Json(projects::get_project(&state.db, id).await?))
}

#[utoipa::path(
    post,
    path = "/v1/projects",
    tag = "Projects",
    operation_id = "createProject",
    summary = "Create a project",
    description = "Creates the project and its genre and age category links in one transaction.",
    request_body = ProjectRequest,
    responses(
        (status = 201, description = "Project created", body = IdResponse),
        (status = 400, description = "Validation error or unknown type, genre or age category (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user, state, payload), fields(user_id = auth_user.user_id, title = %payload.title))]
pub async fn create_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    let write = payload.into_write()?;
    let id = projects::create_project(&state.db, &write).await?;

    tracing::info!(project_id = id, "Project created");
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

#[utoipa::path(
    put,
    path = "/v1/projects/{id}",
    tag = "Projects",
    operation_id = "updateProject",
    summary = "Replace a project",
    description = "Overwrites every scalar field and replaces the genre and age category sets with exactly \
        the given ids. Nothing changes if any part fails.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = ProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 400, description = "Validation error or unknown type, genre or age category (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user, state, payload), fields(user_id = auth_user.user_id, project_id = id))]
pub async fn update_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ProjectRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    let write = payload.into_write()?;
    projects::update_project(&state.db, id, &write).await?;

    tracing::info!("Project updated");
    Ok(Json(projects::get_project(&state.db, id).await?))
}

#[utoipa::path(
    get,
    path = "/v1/projects/search",
    tag = "Projects",
    operation_id = "searchProjects",
    summary = "Search projects",
    description = "Matches `searchTerm` case-insensitively against title, description and keywords, and \
        `genre_id` (repeatable) against the project's genres. Both filters combine with AND. \
        With neither filter the result is empty.",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching projects", body = Vec<ProjectResponse>),
        (status = 400, description = "Malformed query (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state, query))]
pub async fn search_projects(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> Result<Json<Vec<ProjectResponse>>, AppError> {
    let genre_ids = normalize_ids(&query.genre_id, "genre_id")?;
    let found =
        projects::search_projects(&state.db, query.search_term.as_deref(), &genre_ids).await?;
    tracing::debug!(count = found.len(), "Search finished");
    Ok(Json(found))
}

#[utoipa::path(
    post,
    path = "/v1/projects/{id}/cover",
    tag = "Projects",
    operation_id = "uploadCover",
    summary = "Upload a cover image",
    description = "Stores the `image` part (JPEG or PNG) as a new image of the project and makes it the cover \
        in the same transaction.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body(content_type = "multipart/form-data", description = "`image` file"),
    responses(
        (status = 201, description = "Cover stored", body = ImageResponse),
        (status = 400, description = "Validation error, unsupported type or too large (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state, multipart), fields(project_id = id))]
pub async fn upload_cover(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let upload = asset::receive(&mut multipart, MediaKind::Image, &state.images).await?;
    let outcome = assets::insert_image(&state.db, id, &upload.name, true).await;
    let image = upload.settle(outcome).await?;

    tracing::info!(image_id = %image.id, "Cover uploaded");
    Ok((StatusCode::CREATED, Json(image)))
}

#[utoipa::path(
    patch,
    path = "/v1/projects/{id}/cover",
    tag = "Projects",
    operation_id = "setCover",
    summary = "Choose an existing image as cover",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = SetCoverRequest,
    responses(
        (status = 200, description = "Cover changed", body = ProjectResponse),
        (status = 400, description = "Malformed image ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project, or image of this project, not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state, payload), fields(project_id = id, image_id = %payload.image_id))]
pub async fn set_cover(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<SetCoverRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    let name = asset::parse_asset_id(MediaKind::Image, &payload.image_id)?;
    assets::set_cover(&state.db, id, &name).await?;
    Ok(Json(projects::get_project(&state.db, id).await?))
}
