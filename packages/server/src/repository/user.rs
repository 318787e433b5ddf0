use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;

use crate::entity::{role, user, user_role};
use crate::error::AppError;
use crate::repository::session;

/// Profile fields that both the owner and an administrator may change.
#[derive(Debug, Clone)]
pub struct ProfileWrite {
    pub name: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
}

pub async fn find_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
}

pub async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

pub async fn find_role_by_title<C: ConnectionTrait>(
    db: &C,
    title: &str,
) -> Result<Option<role::Model>, DbErr> {
    role::Entity::find()
        .filter(role::Column::Title.eq(title))
        .one(db)
        .await
}

/// All roles held by a user, ordered by id.
pub async fn roles_of<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<role::Model>, DbErr> {
    role::Entity::find()
        .filter(
            role::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(user_role::Column::RoleId)
                    .from(user_role::Entity)
                    .and_where(user_role::Column::UserId.eq(user_id))
                    .to_owned(),
            ),
        )
        .order_by_asc(role::Column::Id)
        .all(db)
        .await
}

/// Every user with their roles, ordered by id.
pub async fn list_with_roles<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<(user::Model, Vec<role::Model>)>, DbErr> {
    let users = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?;

    let links = user_role::Entity::find()
        .order_by_asc(user_role::Column::RoleId)
        .all(db)
        .await?;
    let roles: HashMap<i32, role::Model> = role::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|r| (r.id, r))
        .collect();

    let mut by_user: HashMap<i32, Vec<role::Model>> = HashMap::new();
    for link in links {
        if let Some(r) = roles.get(&link.role_id) {
            by_user.entry(link.user_id).or_default().push(r.clone());
        }
    }

    Ok(users
        .into_iter()
        .map(|u| {
            let roles = by_user.remove(&u.id).unwrap_or_default();
            (u, roles)
        })
        .collect())
}

/// Insert a user holding exactly one role, atomically.
pub async fn create_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password_hash: String,
    role_title: &str,
) -> Result<user::Model, AppError> {
    let txn = db.begin().await?;

    let role = find_role_by_title(&txn, role_title)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Role '{role_title}' has not been seeded")))?;

    let now = Utc::now();
    let user = user::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        date_of_birth: Set(None),
        phone: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(email_conflict)?;

    user_role::Entity::insert(user_role::ActiveModel {
        user_id: Set(user.id),
        role_id: Set(role.id),
    })
    .exec_without_returning(&txn)
    .await?;

    txn.commit().await?;
    Ok(user)
}

pub async fn update_profile(
    db: &DatabaseConnection,
    id: i32,
    profile: &ProfileWrite,
) -> Result<user::Model, AppError> {
    let txn = db.begin().await?;
    let user = apply_profile(&txn, id, profile).await?;
    txn.commit().await?;
    Ok(user)
}

/// Update a user's profile and replace their role set in one transaction.
pub async fn update_user(
    db: &DatabaseConnection,
    id: i32,
    profile: &ProfileWrite,
    role_ids: &[i32],
) -> Result<user::Model, AppError> {
    let txn = db.begin().await?;
    let user = apply_profile(&txn, id, profile).await?;

    user_role::Entity::delete_many()
        .filter(user_role::Column::UserId.eq(id))
        .exec(&txn)
        .await?;

    if !role_ids.is_empty() {
        let found = role::Entity::find()
            .filter(role::Column::Id.is_in(role_ids.to_vec()))
            .count(&txn)
            .await?;
        if found != role_ids.len() as u64 {
            return Err(AppError::Validation(
                "role_ids must reference existing roles".into(),
            ));
        }

        let rows = role_ids.iter().map(|&role_id| user_role::ActiveModel {
            user_id: Set(id),
            role_id: Set(role_id),
        });
        user_role::Entity::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(user)
}

async fn apply_profile(
    txn: &DatabaseTransaction,
    id: i32,
    profile: &ProfileWrite,
) -> Result<user::Model, AppError> {
    let existing = find_user(txn, id).await?;

    let mut active: user::ActiveModel = existing.into();
    active.name = Set(profile.name.clone());
    active.email = Set(profile.email.clone());
    active.date_of_birth = Set(profile.date_of_birth);
    active.phone = Set(profile.phone.clone());
    active.updated_at = Set(Utc::now());

    active.update(txn).await.map_err(email_conflict)
}

/// Store a new password hash and end every session of the user.
pub async fn change_password(
    db: &DatabaseConnection,
    id: i32,
    password_hash: String,
) -> Result<(), AppError> {
    let txn = db.begin().await?;
    let existing = find_user(&txn, id).await?;

    let mut active: user::ActiveModel = existing.into();
    active.password_hash = Set(password_hash);
    active.updated_at = Set(Utc::now());
    active.update(&txn).await?;

    session::revoke_all(&txn, id).await?;

    txn.commit().await?;
    Ok(())
}

/// Delete a user with their memberships and sessions.
pub async fn delete_user(db: &DatabaseConnection, id: i32) -> Result<(), AppError> {
    let txn = db.begin().await?;
    find_user(&txn, id).await?;

    session::revoke_all(&txn, id).await?;
    user_role::Entity::delete_many()
        .filter(user_role::Column::UserId.eq(id))
        .exec(&txn)
        .await?;
    user::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(())
}

fn email_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Unique constraint caught on user write");
            AppError::Conflict("Email is already registered".into())
        }
        _ => AppError::from(err),
    }
}
