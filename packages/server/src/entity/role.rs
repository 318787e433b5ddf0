use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The role assigned to newly registered users.
pub const DEFAULT_ROLE: &str = "user";

/// The role granted to the bootstrap administrator.
pub const ADMIN_ROLE: &str = "admin";

/// A named permission bundle. Each column holds a level from 0 to 3 for one
/// resource family.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub title: String,
    pub projects: i32,
    pub genres: i32,
    pub age_categories: i32,
    pub types: i32,
    pub users: i32,
    pub roles: i32,

    #[sea_orm(has_many, via = "user_role")]
    pub members: HasMany<super::user::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
