use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::info;

use crate::config::AuthConfig;
use crate::entity::role::{self, ADMIN_ROLE, DEFAULT_ROLE};
use crate::repository::user as users;
use crate::utils::hash;

/// Built-in roles: title and the level granted on every resource family.
const BUILTIN_ROLES: &[(&str, i32)] = &[(ADMIN_ROLE, 3), (DEFAULT_ROLE, 0)];

/// Ensure the built-in roles exist. Existing rows are left untouched so
/// levels edited by an administrator survive restarts.
pub async fn seed_roles(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut inserted = 0u32;
    for &(title, level) in BUILTIN_ROLES {
        let model = role::ActiveModel {
            title: Set(title.to_string()),
            projects: Set(level),
            genres: Set(level),
            age_categories: Set(level),
            types: Set(level),
            users: Set(level),
            roles: Set(level),
            ..Default::default()
        };

        let result = role::Entity::insert(model)
            .on_conflict(
                OnConflict::column(role::Column::Title)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if inserted > 0 {
        info!("Seeded {} built-in roles", inserted);
    }
    Ok(())
}

/// Create the bootstrap administrator when configured and not yet present.
pub async fn seed_admin(db: &DatabaseConnection, auth: &AuthConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&auth.admin_email, &auth.admin_password) else {
        return Ok(());
    };

    if users::find_by_email(db, email).await?.is_some() {
        return Ok(());
    }

    let password_hash = hash::hash_password(password)?;
    let admin = users::create_user(db, "Administrator", email, password_hash, ADMIN_ROLE)
        .await
        .map_err(|e| anyhow::anyhow!("failed to create admin user: {e:?}"))?;

    info!(user_id = admin.id, "Created bootstrap administrator");
    Ok(())
}
