use serde::{Deserialize, Serialize};

use crate::entity::role;
use crate::error::AppError;
use crate::models::shared::validate_title;

/// Request body for creating or replacing a role.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RoleRequest {
    #[schema(example = "editor")]
    pub title: String,
    /// Level for projects and their images/videos (0-3).
    #[schema(example = 3)]
    pub projects: i32,
    #[schema(example = 2)]
    pub genres: i32,
    #[schema(example = 2)]
    pub age_categories: i32,
    #[schema(example = 2)]
    pub types: i32,
    #[schema(example = 0)]
    pub users: i32,
    #[schema(example = 0)]
    pub roles: i32,
}

pub fn validate_role_request(payload: &RoleRequest) -> Result<(), AppError> {
    validate_title(&payload.title, "Title")?;
    let levels = [
        ("projects", payload.projects),
        ("genres", payload.genres),
        ("age_categories", payload.age_categories),
        ("types", payload.types),
        ("users", payload.users),
        ("roles", payload.roles),
    ];
    for (name, level) in levels {
        if !(0..=3).contains(&level) {
            return Err(AppError::Validation(format!(
                "{name} level must be between 0 and 3"
            )));
        }
    }
    Ok(())
}

#[derive(Serialize, Clone, utoipa::ToSchema)]
pub struct RoleResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "admin")]
    pub title: String,
    #[schema(example = 3)]
    pub projects: i32,
    #[schema(example = 3)]
    pub genres: i32,
    #[schema(example = 3)]
    pub age_categories: i32,
    #[schema(example = 3)]
    pub types: i32,
    #[schema(example = 3)]
    pub users: i32,
    #[schema(example = 3)]
    pub roles: i32,
}

impl From<role::Model> for RoleResponse {
    fn from(m: role::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            projects: m.projects,
            genres: m.genres,
            age_categories: m.age_categories,
            types: m.types,
            users: m.users,
            roles: m.roles,
        }
    }
}
