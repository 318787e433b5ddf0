use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::asset::{self, Disposition};
use crate::models::asset::ImageResponse;
use crate::repository::asset as assets;
use crate::state::AppState;
use crate::utils::media::MediaKind;

#[utoipa::path(
    post,
    path = "/v1/projects/images",
    tag = "Images",
    operation_id = "uploadImage",
    summary = "Upload a project image",
    description = "Multipart form with an `image` file part (JPEG or PNG) and a `project_id` text part.",
    request_body(content_type = "multipart/form-data", description = "`image` file and `project_id`"),
    responses(
        (status = 201, description = "Image stored", body = ImageResponse),
        (status = 400, description = "Validation error, unsupported type or too large (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user, state, multipart), fields(user_id = auth_user.user_id))]
pub async fn upload_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let upload = asset::receive(&mut multipart, MediaKind::Image, &state.images).await?;

    let outcome = async {
        let project_id: i32 = upload.required("project_id")?;
        assets::insert_image(&state.db, project_id, &upload.name, false).await
    }
    .await;
    let image = upload.settle(outcome).await?;

    tracing::info!(image_id = %image.id, project_id = image.project_id, "Image uploaded");
    Ok((StatusCode::CREATED, Json(image)))
}

#[utoipa::path(
    get,
    path = "/v1/projects/images/{id}",
    tag = "Images",
    operation_id = "downloadImage",
    summary = "Download an image",
    description = "Streams the image as an attachment.",
    params(("id" = String, Path, description = "Image ID (generated file name)")),
    responses(
        (status = 200, description = "Image bytes", content_type = "application/octet-stream"),
        (status = 400, description = "Malformed image ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state), fields(image_id = %id))]
pub async fn download_image(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    fetch(&state, &id, Disposition::Attachment).await
}

#[utoipa::path(
    get,
    path = "/v1/projects/images/show/{id}",
    tag = "Images",
    operation_id = "showImage",
    summary = "Show an image inline",
    params(("id" = String, Path, description = "Image ID (generated file name)")),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 400, description = "Malformed image ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state), fields(image_id = %id))]
pub async fn show_image(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    fetch(&state, &id, Disposition::Inline).await
}

#[utoipa::path(
    delete,
    path = "/v1/projects/images/{id}",
    tag = "Images",
    operation_id = "deleteImage",
    summary = "Delete an image",
    description = "Removes the image record, clears any cover pointing at it, then removes the file.",
    params(("id" = String, Path, description = "Image ID (generated file name)")),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 400, description = "Malformed image ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, SESSION_NOT_FOUND)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(_auth_user, state), fields(image_id = %id))]
pub async fn delete_image(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let name = asset::parse_asset_id(MediaKind::Image, &id)?;

    assets::delete_image(&state.db, &name).await?;
    asset::discard(state.images.as_ref(), &name).await;

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch(state: &AppState, id: &str, disposition: Disposition) -> Result<Response, AppError> {
    let name = asset::parse_asset_id(MediaKind::Image, id)?;
    assets::find_image(&state.db, &name).await?;
    asset::serve(state.images.as_ref(), &name, disposition).await
}
