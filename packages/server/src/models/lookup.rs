//! Payloads shared by the genre, age category and type endpoints.

use serde::{Deserialize, Serialize};

use crate::entity::{age_category, genre, project_type};

/// Request body for creating or renaming a lookup entry.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LookupRequest {
    #[schema(example = "Comedy")]
    pub title: String,
}

/// A genre, age category or type.
#[derive(Serialize, Clone, utoipa::ToSchema)]
pub struct LookupResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Comedy")]
    pub title: String,
}

impl From<genre::Model> for LookupResponse {
    fn from(m: genre::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
        }
    }
}

impl From<age_category::Model> for LookupResponse {
    fn from(m: age_category::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
        }
    }
}

impl From<project_type::Model> for LookupResponse {
    fn from(m: project_type::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
        }
    }
}
