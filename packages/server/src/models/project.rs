use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::asset::{ImageResponse, VideoResponse};
use crate::models::lookup::LookupResponse;
use crate::models::shared::{normalize_ids, validate_title};
use crate::repository::project::ProjectWrite;

/// Request body for creating or replacing a project.
///
/// Genre and age category lists replace the current associations.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ProjectRequest {
    #[schema(example = "Kazakh Khanate")]
    pub title: String,
    #[serde(default)]
    #[schema(example = "Historical drama series.")]
    pub description: String,
    #[schema(example = 1)]
    pub type_id: i32,
    #[schema(example = 45)]
    pub duration_in_mins: i32,
    #[schema(example = 2019)]
    pub release_year: i32,
    #[serde(default)]
    #[schema(example = "Rustem Abdrashev")]
    pub director: String,
    #[serde(default)]
    #[schema(example = "Kazakhfilm")]
    pub producer: String,
    #[serde(default)]
    #[schema(example = "history, khanate")]
    pub keywords: String,
    #[serde(default)]
    #[schema(example = json!([1, 2]))]
    pub genre_ids: Vec<i32>,
    #[serde(default)]
    #[schema(example = json!([3]))]
    pub age_category_ids: Vec<i32>,
}

impl ProjectRequest {
    /// Validate and normalize into a repository write.
    pub fn into_write(self) -> Result<ProjectWrite, AppError> {
        validate_title(&self.title, "Title")?;
        if self.type_id <= 0 {
            return Err(AppError::Validation("type_id must be a positive id".into()));
        }
        if self.duration_in_mins < 0 {
            return Err(AppError::Validation(
                "duration_in_mins must not be negative".into(),
            ));
        }
        if !(1800..=2200).contains(&self.release_year) {
            return Err(AppError::Validation(
                "release_year must be between 1800 and 2200".into(),
            ));
        }

        Ok(ProjectWrite {
            title: self.title.trim().to_string(),
            description: self.description,
            type_id: self.type_id,
            duration_in_mins: self.duration_in_mins,
            release_year: self.release_year,
            director: self.director.trim().to_string(),
            producer: self.producer.trim().to_string(),
            keywords: self.keywords,
            genre_ids: normalize_ids(&self.genre_ids, "genre_ids")?,
            age_category_ids: normalize_ids(&self.age_category_ids, "age_category_ids")?,
        })
    }
}

/// Request body for choosing an existing image as cover.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SetCoverRequest {
    #[schema(example = "0b9f1c5e-6f4e-4a47-9a4e-2b6c0f2f1d3a.png")]
    pub image_id: String,
}

/// Query parameters for project search.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive match against title, description and keywords.
    #[serde(rename = "searchTerm")]
    pub search_term: Option<String>,
    /// Restrict to projects in any of these genres. Repeat the key for
    /// several ids.
    #[serde(default)]
    pub genre_id: Vec<i32>,
}

/// A project with everything it references.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectResponse {
    #[schema(example = 7)]
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[schema(example = "Kazakh Khanate")]
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub project_type: LookupResponse,
    #[schema(example = 45)]
    pub duration_in_mins: i32,
    #[schema(example = 2019)]
    pub release_year: i32,
    pub director: String,
    pub producer: String,
    pub keywords: String,
    pub cover: Option<ImageResponse>,
    pub genres: Vec<LookupResponse>,
    pub age_categories: Vec<LookupResponse>,
    pub images: Vec<ImageResponse>,
    pub videos: Vec<VideoResponse>,
}
