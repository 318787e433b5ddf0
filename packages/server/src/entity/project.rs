use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub type_id: i32,
    #[sea_orm(belongs_to, from = "type_id", to = "id", on_delete = "Restrict")]
    pub project_type: HasOne<super::project_type::Entity>,

    pub duration_in_mins: i32,
    pub release_year: i32,
    pub director: String,
    pub producer: String,
    #[sea_orm(column_type = "Text")]
    pub keywords: String,

    /// Name of an image owned by this project. Not a foreign key: images
    /// already reference projects, and the pair is kept consistent by the
    /// repository.
    pub cover: Option<String>,

    #[sea_orm(has_many, via = "project_genre")]
    pub genres: HasMany<super::genre::Entity>,

    #[sea_orm(has_many, via = "project_age_category")]
    pub age_categories: HasMany<super::age_category::Entity>,

    #[sea_orm(has_many)]
    pub images: HasMany<super::image::Entity>,

    #[sea_orm(has_many)]
    pub videos: HasMany<super::video::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
