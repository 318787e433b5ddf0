use std::collections::HashMap;

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, Query as SeaQuery};
use sea_orm::*;

use crate::entity::{
    age_category, genre, image, project, project_age_category, project_genre, project_type,
    video,
};
use crate::error::AppError;
use crate::models::asset::{ImageResponse, VideoResponse};
use crate::models::lookup::LookupResponse;
use crate::models::project::ProjectResponse;
use crate::models::shared::escape_like;

/// Validated scalar fields plus the complete association sets of a project.
#[derive(Debug, Clone)]
pub struct ProjectWrite {
    pub title: String,
    pub description: String,
    pub type_id: i32,
    pub duration_in_mins: i32,
    pub release_year: i32,
    pub director: String,
    pub producer: String,
    pub keywords: String,
    pub genre_ids: Vec<i32>,
    pub age_category_ids: Vec<i32>,
}

/// Insert a project and its genre/age category rows in one transaction.
pub async fn create_project(db: &DatabaseConnection, input: &ProjectWrite) -> Result<i32, AppError> {
    let txn = db.begin().await?;

    let now = Utc::now();
    let model = project::ActiveModel {
        title: Set(input.title.clone()),
        description: Set(input.description.clone()),
        type_id: Set(input.type_id),
        duration_in_mins: Set(input.duration_in_mins),
        release_year: Set(input.release_year),
        director: Set(input.director.clone()),
        producer: Set(input.producer.clone()),
        keywords: Set(input.keywords.clone()),
        cover: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(reference_error)?;

    insert_associations(&txn, model.id, input).await?;

    txn.commit().await?;
    Ok(model.id)
}

/// Overwrite a project's scalar fields and replace its associations.
///
/// After success the project's genres and age categories are exactly the
/// ids in `input`. Any failure leaves the project as it was.
pub async fn update_project(
    db: &DatabaseConnection,
    id: i32,
    input: &ProjectWrite,
) -> Result<(), AppError> {
    let txn = db.begin().await?;
    let existing = find_project(&txn, id).await?;

    let mut active: project::ActiveModel = existing.into();
    active.title = Set(input.title.clone());
    active.description = Set(input.description.clone());
    active.type_id = Set(input.type_id);
    active.duration_in_mins = Set(input.duration_in_mins);
    active.release_year = Set(input.release_year);
    active.director = Set(input.director.clone());
    active.producer = Set(input.producer.clone());
    active.keywords = Set(input.keywords.clone());
    active.updated_at = Set(Utc::now());
    active.update(&txn).await.map_err(reference_error)?;

    project_genre::Entity::delete_many()
        .filter(project_genre::Column::ProjectId.eq(id))
        .exec(&txn)
        .await?;
    project_age_category::Entity::delete_many()
        .filter(project_age_category::Column::ProjectId.eq(id))
        .exec(&txn)
        .await?;

    insert_associations(&txn, id, input).await?;

    txn.commit().await?;
    Ok(())
}

async fn insert_associations<C: ConnectionTrait>(
    db: &C,
    project_id: i32,
    input: &ProjectWrite,
) -> Result<(), AppError> {
    if !input.genre_ids.is_empty() {
        let rows = input
            .genre_ids
            .iter()
            .map(|&genre_id| project_genre::ActiveModel {
                project_id: Set(project_id),
                genre_id: Set(genre_id),
            });
        project_genre::Entity::insert_many(rows)
            .exec_without_returning(db)
            .await
            .map_err(reference_error)?;
    }

    if !input.age_category_ids.is_empty() {
        let rows = input
            .age_category_ids
            .iter()
            .map(|&age_category_id| project_age_category::ActiveModel {
                project_id: Set(project_id),
                age_category_id: Set(age_category_id),
            });
        project_age_category::Entity::insert_many(rows)
            .exec_without_returning(db)
            .await
            .map_err(reference_error)?;
    }

    Ok(())
}

/// Foreign key violations on project writes mean the client named a type,
/// genre or age category that does not exist.
fn reference_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => AppError::Validation(
            "type_id, genre_ids and age_category_ids must reference existing records".into(),
        ),
        _ => AppError::from(err),
    }
}

pub async fn find_project<C: ConnectionTrait>(db: &C, id: i32) -> Result<project::Model, AppError> {
    project::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
}

/// Load one project view from a single snapshot.
pub async fn get_project(db: &DatabaseConnection, id: i32) -> Result<ProjectResponse, AppError> {
    let txn = db.begin().await?;
    let model = find_project(&txn, id).await?;
    let mut views = assemble(&txn, vec![model]).await?;
    txn.commit().await?;

    views
        .pop()
        .ok_or_else(|| AppError::Internal(format!("project {id} vanished during assembly")))
}

pub async fn list_projects(db: &DatabaseConnection) -> Result<Vec<ProjectResponse>, AppError> {
    let txn = db.begin().await?;
    let projects = project::Entity::find()
        .order_by_asc(project::Column::Id)
        .all(&txn)
        .await?;
    let views = assemble(&txn, projects).await?;
    txn.commit().await?;
    Ok(views)
}

/// Search by text and/or genre. Both filters must hold when both are given;
/// with neither there is nothing to match and the result is empty.
pub async fn search_projects(
    db: &DatabaseConnection,
    term: Option<&str>,
    genre_ids: &[i32],
) -> Result<Vec<ProjectResponse>, AppError> {
    let term = term.map(str::trim).filter(|t| !t.is_empty());
    if term.is_none() && genre_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut select = project::Entity::find();

    if let Some(term) = term {
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        let contains = |column: project::Column| {
            Expr::expr(Func::lower(Expr::col(column)))
                .like(LikeExpr::new(pattern.clone()).escape('\\'))
        };
        select = select.filter(
            Condition::any()
                .add(contains(project::Column::Title))
                .add(contains(project::Column::Description))
                .add(contains(project::Column::Keywords)),
        );
    }

    if !genre_ids.is_empty() {
        select = select.filter(
            project::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(project_genre::Column::ProjectId)
                    .from(project_genre::Entity)
                    .and_where(project_genre::Column::GenreId.is_in(genre_ids.to_vec()))
                    .to_owned(),
            ),
        );
    }

    let txn = db.begin().await?;
    let projects = select
        .order_by_asc(project::Column::Id)
        .all(&txn)
        .await?;
    let views = assemble(&txn, projects).await?;
    txn.commit().await?;
    Ok(views)
}

/// Attach type, cover, genres, age categories, images and videos to a batch
/// of projects with one query per related table.
async fn assemble<C: ConnectionTrait>(
    db: &C,
    projects: Vec<project::Model>,
) -> Result<Vec<ProjectResponse>, AppError> {
    if projects.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = projects.iter().map(|p| p.id).collect();
    let type_ids: Vec<i32> = projects.iter().map(|p| p.type_id).collect();

    let types: HashMap<i32, LookupResponse> = project_type::Entity::find()
        .filter(project_type::Column::Id.is_in(type_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, LookupResponse::from(t)))
        .collect();

    let genre_links = project_genre::Entity::find()
        .filter(project_genre::Column::ProjectId.is_in(ids.clone()))
        .order_by_asc(project_genre::Column::GenreId)
        .all(db)
        .await?;
    let genres: HashMap<i32, LookupResponse> = genre::Entity::find()
        .filter(genre::Column::Id.is_in(genre_links.iter().map(|l| l.genre_id).collect::<Vec<_>>()))
        .all(db)
        .await?
        .into_iter()
        .map(|g| (g.id, LookupResponse::from(g)))
        .collect();
    let mut genres_by_project: HashMap<i32, Vec<LookupResponse>> = HashMap::new();
    for link in genre_links {
        if let Some(g) = genres.get(&link.genre_id) {
            genres_by_project
                .entry(link.project_id)
                .or_default()
                .push(g.clone());
        }
    }

    let age_links = project_age_category::Entity::find()
        .filter(project_age_category::Column::ProjectId.is_in(ids.clone()))
        .order_by_asc(project_age_category::Column::AgeCategoryId)
        .all(db)
        .await?;
    let age_categories: HashMap<i32, LookupResponse> = age_category::Entity::find()
        .filter(
            age_category::Column::Id
                .is_in(age_links.iter().map(|l| l.age_category_id).collect::<Vec<_>>()),
        )
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.id, LookupResponse::from(a)))
        .collect();
    let mut ages_by_project: HashMap<i32, Vec<LookupResponse>> = HashMap::new();
    for link in age_links {
        if let Some(a) = age_categories.get(&link.age_category_id) {
            ages_by_project
                .entry(link.project_id)
                .or_default()
                .push(a.clone());
        }
    }

    let mut images_by_project: HashMap<i32, Vec<ImageResponse>> = HashMap::new();
    for img in image::Entity::find()
        .filter(image::Column::ProjectId.is_in(ids.clone()))
        .order_by_asc(image::Column::CreatedAt)
        .all(db)
        .await?
    {
        images_by_project
            .entry(img.project_id)
            .or_default()
            .push(img.into());
    }

    let mut videos_by_project: HashMap<i32, Vec<VideoResponse>> = HashMap::new();
    for vid in video::Entity::find()
        .filter(video::Column::ProjectId.is_in(ids))
        .order_by_asc(video::Column::Season)
        .order_by_asc(video::Column::Episode)
        .order_by_asc(video::Column::CreatedAt)
        .all(db)
        .await?
    {
        videos_by_project
            .entry(vid.project_id)
            .or_default()
            .push(vid.into());
    }

    projects
        .into_iter()
        .map(|p| {
            let project_type = types.get(&p.type_id).cloned().ok_or_else(|| {
                AppError::Internal(format!("project {} references missing type {}", p.id, p.type_id))
            })?;
            let images = images_by_project.remove(&p.id).unwrap_or_default();
            let cover = p
                .cover
                .as_ref()
                .and_then(|c| images.iter().find(|i| &i.id == c).cloned());

            Ok(ProjectResponse {
                id: p.id,
                created_at: p.created_at,
                updated_at: p.updated_at,
                title: p.title,
                description: p.description,
                project_type,
                duration_in_mins: p.duration_in_mins,
                release_year: p.release_year,
                director: p.director,
                producer: p.producer,
                keywords: p.keywords,
                cover,
                genres: genres_by_project.remove(&p.id).unwrap_or_default(),
                age_categories: ages_by_project.remove(&p.id).unwrap_or_default(),
                images,
                videos: videos_by_project.remove(&p.id).unwrap_or_default(),
            })
        })
        .collect()
}
