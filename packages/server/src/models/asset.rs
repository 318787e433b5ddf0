use serde::Serialize;

use crate::entity::{image, video};

#[derive(Serialize, Clone, utoipa::ToSchema)]
pub struct ImageResponse {
    /// Generated file name, also the image ID.
    #[schema(example = "0b9f1c5e-6f4e-4a47-9a4e-2b6c0f2f1d3a.png")]
    pub id: String,
    #[schema(example = 7)]
    pub project_id: i32,
}

impl From<image::Model> for ImageResponse {
    fn from(m: image::Model) -> Self {
        Self {
            id: m.id,
            project_id: m.project_id,
        }
    }
}

#[derive(Serialize, Clone, utoipa::ToSchema)]
pub struct VideoResponse {
    /// Generated file name, also the video ID.
    #[schema(example = "5d3c7a0e-1f0b-4c8e-8d2a-9e6b3f7c4a21.mp4")]
    pub id: String,
    #[schema(example = 7)]
    pub project_id: i32,
    #[schema(example = 1)]
    pub season: i32,
    #[schema(example = 3)]
    pub episode: i32,
}

impl From<video::Model> for VideoResponse {
    fn from(m: video::Model) -> Self {
        Self {
            id: m.id,
            project_id: m.project_id,
            season: m.season,
            episode: m.episode,
        }
    }
}
