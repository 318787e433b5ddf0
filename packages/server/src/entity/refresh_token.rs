use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A login session. Access tokens are only honoured while their owner has at
/// least one unexpired row here.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "refresh_tokens")]
pub struct Model {
    /// 64 hex characters.
    #[sea_orm(primary_key, auto_increment = false)]
    pub token: String,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::user::Entity>,

    pub expires_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
