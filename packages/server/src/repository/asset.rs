use chrono::Utc;
use common::storage::AssetName;
use sea_orm::prelude::Expr;
use sea_orm::*;

use crate::entity::{image, project, video};
use crate::error::AppError;
use crate::models::asset::{ImageResponse, VideoResponse};
use crate::repository::project::find_project;

/// Record an uploaded image, optionally making it the project's cover in the
/// same transaction.
pub async fn insert_image(
    db: &DatabaseConnection,
    project_id: i32,
    name: &AssetName,
    as_cover: bool,
) -> Result<ImageResponse, AppError> {
    let txn = db.begin().await?;
    let project = find_project(&txn, project_id).await?;

    let now = Utc::now();
    image::Entity::insert(image::ActiveModel {
        id: Set(name.to_string()),
        project_id: Set(project_id),
        created_at: Set(now),
    })
    .exec_without_returning(&txn)
    .await?;

    if as_cover {
        let mut active: project::ActiveModel = project.into();
        active.cover = Set(Some(name.to_string()));
        active.updated_at = Set(now);
        active.update(&txn).await?;
    }

    txn.commit().await?;

    Ok(ImageResponse {
        id: name.to_string(),
        project_id,
    })
}

/// Point a project's cover at one of its existing images.
pub async fn set_cover(
    db: &DatabaseConnection,
    project_id: i32,
    name: &AssetName,
) -> Result<(), AppError> {
    let txn = db.begin().await?;
    let project = find_project(&txn, project_id).await?;

    let owned = image::Entity::find_by_id(name.to_string())
        .filter(image::Column::ProjectId.eq(project_id))
        .one(&txn)
        .await?
        .is_some();
    if !owned {
        return Err(AppError::NotFound("Image not found for this project".into()));
    }

    let mut active: project::ActiveModel = project.into();
    active.cover = Set(Some(name.to_string()));
    active.updated_at = Set(Utc::now());
    active.update(&txn).await?;

    txn.commit().await?;
    Ok(())
}

pub async fn find_image<C: ConnectionTrait>(db: &C, name: &AssetName) -> Result<image::Model, AppError> {
    image::Entity::find_by_id(name.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".into()))
}

/// Remove an image row, clearing any cover that points at it.
pub async fn delete_image(db: &DatabaseConnection, name: &AssetName) -> Result<(), AppError> {
    let txn = db.begin().await?;
    find_image(&txn, name).await?;

    project::Entity::update_many()
        .col_expr(project::Column::Cover, Expr::value(Option::<String>::None))
        .filter(project::Column::Cover.eq(name.as_str()))
        .exec(&txn)
        .await?;

    image::Entity::delete_by_id(name.to_string())
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(())
}

pub async fn insert_video(
    db: &DatabaseConnection,
    project_id: i32,
    name: &AssetName,
    season: i32,
    episode: i32,
) -> Result<VideoResponse, AppError> {
    let txn = db.begin().await?;
    find_project(&txn, project_id).await?;

    video::Entity::insert(video::ActiveModel {
        id: Set(name.to_string()),
        project_id: Set(project_id),
        season: Set(season),
        episode: Set(episode),
        created_at: Set(Utc::now()),
    })
    .exec_without_returning(&txn)
    .await?;

    txn.commit().await?;

    Ok(VideoResponse {
        id: name.to_string(),
        project_id,
        season,
        episode,
    })
}

pub async fn find_video<C: ConnectionTrait>(db: &C, name: &AssetName) -> Result<video::Model, AppError> {
    video::Entity::find_by_id(name.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".into()))
}

pub async fn delete_video(db: &DatabaseConnection, name: &AssetName) -> Result<(), AppError> {
    let result = video::Entity::delete_by_id(name.to_string())
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Video not found".into()));
    }
    Ok(())
}
