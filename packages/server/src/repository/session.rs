use chrono::{Duration, Utc};
use sea_orm::*;

use crate::config::AuthConfig;
use crate::entity::{refresh_token, user};
use crate::error::AppError;
use crate::models::auth::TokenPair;
use crate::repository::user::find_user;
use crate::utils::{jwt, refresh};

/// Mint an access token and persist a new refresh token for the user.
///
/// This and [`rotate`] are the only places sessions are created.
pub async fn issue<C: ConnectionTrait>(
    db: &C,
    user: &user::Model,
    auth: &AuthConfig,
) -> Result<TokenPair, AppError> {
    let access_token = jwt::sign(
        user.id,
        &user.email,
        &auth.jwt_secret,
        Duration::seconds(auth.access_token_ttl_secs),
    )?;
    let refresh_token = refresh::make_refresh_token()?;

    let now = Utc::now();
    refresh_token::Entity::insert(refresh_token::ActiveModel {
        token: Set(refresh_token.clone()),
        user_id: Set(user.id),
        expires_at: Set(now + Duration::seconds(auth.refresh_token_ttl_secs)),
        created_at: Set(now),
    })
    .exec_without_returning(db)
    .await?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Whether the user holds at least one unexpired refresh token.
pub async fn has_live_session<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<bool, DbErr> {
    let live = refresh_token::Entity::find()
        .filter(refresh_token::Column::UserId.eq(user_id))
        .filter(refresh_token::Column::ExpiresAt.gt(Utc::now()))
        .count(db)
        .await?;
    Ok(live > 0)
}

/// Exchange a live refresh token for a new pair. The presented token is
/// consumed and cannot be used again.
pub async fn rotate(
    db: &DatabaseConnection,
    presented: &str,
    auth: &AuthConfig,
) -> Result<TokenPair, AppError> {
    let txn = db.begin().await?;

    let row = refresh_token::Entity::find_by_id(presented.to_string())
        .filter(refresh_token::Column::ExpiresAt.gt(Utc::now()))
        .one(&txn)
        .await?
        .ok_or(AppError::TokenInvalid)?;

    // A concurrent rotation of the same token deletes nothing here.
    let deleted = refresh_token::Entity::delete_by_id(row.token.clone())
        .exec(&txn)
        .await?;
    if deleted.rows_affected != 1 {
        return Err(AppError::TokenInvalid);
    }

    let user = find_user(&txn, row.user_id).await?;
    let pair = issue(&txn, &user, auth).await?;

    txn.commit().await?;
    Ok(pair)
}

/// End every session of the user. Returns how many were removed.
pub async fn revoke_all<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<u64, DbErr> {
    let result = refresh_token::Entity::delete_many()
        .filter(refresh_token::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Drop the user's expired sessions.
pub async fn purge_expired<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<u64, DbErr> {
    let result = refresh_token::Entity::delete_many()
        .filter(refresh_token::Column::UserId.eq(user_id))
        .filter(refresh_token::Column::ExpiresAt.lte(Utc::now()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
