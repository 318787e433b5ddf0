use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::asset::{self, Disposition, Upload};
use crate::models::asset::VideoResponse;
use crate::repository::asset as assets;
use crate::state::AppState;
use crate::utils::media::MediaKind;

#[utoipa::path(
    post,
    path = "/v1/projects/videos",
    tag = "Videos",
    operation_id = "uploadVideo",
    summary = "Upload a project video",
    description = "Multipart form with a `video` file part (MP4), a `project_id` text part and \
        optional `season` and `episode` parts (both default to 1).",
    request_body(content_type = "multipart/form-data", description = "`video` file, `project_id`, `season`, `episode`"),
    responses(
        (status = 201, description = "Video stored", body = VideoResponse),
        (status = 400, description = "Validation error, unsupported type or too large (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user, state, multipart), fields(user_id = auth_user.user_id))]
pub async fn upload_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let upload = asset::receive(&mut multipart, MediaKind::Video, &state.videos).await?;

    let outcome = async {
        let project_id: i32 = upload.required("project_id")?;
        let season = numbering(&upload, "season")?;
        let episode = numbering(&upload, "episode")?;
        assets::insert_video(&state.db, project_id, &upload.name, season, episode).await
    }
    .await;
    let video = upload.settle(outcome).await?;

    tracing::info!(
        video_id = %video.id,
        project_id = video.project_id,
        season = video.season,
        episode = video.episode,
        "Video uploaded"
    );
    Ok((StatusCode::CREATED, Json(video)))
}

#[utoipa::path(
    get,
    path = "/v1/projects/videos/{id}",
    tag = "Videos",
    operation_id = "downloadVideo",
    summary = "Download a video",
    params(("id" = String, Path, description = "Video ID (generated file name)")),
    responses(
        (status = 200, description = "Video bytes", content_type = "application/octet-stream"),
        (status = 400, description = "Malformed video ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state), fields(video_id = %id))]
pub async fn download_video(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    fetch(&state, &id, Disposition::Attachment).await
}

#[utoipa::path(
    get,
    path = "/v1/projects/videos/play/{id}",
    tag = "Videos",
    operation_id = "playVideo",
    summary = "Stream a video inline",
    params(("id" = String, Path, description = "Video ID (generated file name)")),
    responses(
        (status = 200, description = "Video stream", content_type = "video/mp4"),
        (status = 400, description = "Malformed video ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state), fields(video_id = %id))]
pub async fn play_video(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    fetch(&state, &id, Disposition::Inline).await
}

#[utoipa::path(
    delete,
    path = "/v1/projects/videos/{id}",
    tag = "Videos",
    operation_id = "deleteVideo",
    summary = "Delete a video",
    params(("id" = String, Path, description = "Video ID (generated file name)")),
    responses(
        (status = 204, description = "Video deleted"),
        (status = 400, description = "Malformed video ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state), fields(video_id = %id))]
pub async fn delete_video(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let name = asset::parse_asset_id(MediaKind::Video, &id)?;

    assets::delete_video(&state.db, &name).await?;
    asset::discard(state.videos.as_ref(), &name).await;

    Ok(StatusCode::NO_CONTENT)
}

/// Season or episode number: defaults to 1, must be positive.
fn numbering(upload: &Upload, key: &str) -> Result<i32, AppError> {
    let value = upload.field::<i32>(key)?.unwrap_or(1);
    if value < 1 {
        return Err(AppError::Validation(format!("{key} must be at least 1")));
    }
    Ok(value)
}

async fn fetch(state: &AppState, id: &str, disposition: Disposition) -> Result<Response, AppError> {
    let name = asset::parse_asset_id(MediaKind::Video, id)?;
    assets::find_video(&state.db, &name).await?;
    asset::serve(state.videos.as_ref(), &name, disposition).await
}
