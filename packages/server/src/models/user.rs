use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::AppError;
use crate::models::role::RoleResponse;

/// Request body for user registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Display name (1-128 chars).
    #[schema(example = "Alice")]
    pub name: String,
    /// Unique email, used to sign in.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    validate_name(&payload.name)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password)
}

/// Request body for updating the caller's own profile.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    #[schema(example = "Alice")]
    pub name: String,
    /// Changing the email ends the current session's validity: access
    /// tokens carry the email they were issued for.
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "1990-04-12")]
    pub date_of_birth: Option<NaiveDate>,
    #[schema(example = "+7 700 000 00 00")]
    pub phone: Option<String>,
}

pub fn validate_update_profile_request(payload: &UpdateProfileRequest) -> Result<(), AppError> {
    validate_name(&payload.name)?;
    validate_email(&payload.email)?;
    validate_phone(payload.phone.as_deref())
}

/// Request body for an administrator updating any user.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    #[schema(example = "Alice")]
    pub name: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "1990-04-12")]
    pub date_of_birth: Option<NaiveDate>,
    #[schema(example = "+7 700 000 00 00")]
    pub phone: Option<String>,
    /// Replaces the user's role set.
    #[schema(example = json!([2]))]
    pub role_ids: Vec<i32>,
}

pub fn validate_update_user_request(payload: &UpdateUserRequest) -> Result<(), AppError> {
    validate_name(&payload.name)?;
    validate_email(&payload.email)?;
    validate_phone(payload.phone.as_deref())
}

/// Request body for changing the caller's password.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ChangePasswordRequest {
    #[schema(example = "s3cure_P@ss!")]
    pub current_password: String,
    #[schema(example = "n3w_s3cure_P@ss!")]
    pub new_password: String,
}

pub fn validate_change_password_request(payload: &ChangePasswordRequest) -> Result<(), AppError> {
    if payload.current_password.is_empty() {
        return Err(AppError::Validation(
            "Current password must not be empty".into(),
        ));
    }
    validate_password(&payload.new_password)
}

/// A user together with their roles. The password hash is never included.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "Alice")]
    pub name: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
    pub roles: Vec<RoleResponse>,
}

impl UserResponse {
    pub fn new(user: user::Model, roles: Vec<RoleResponse>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            date_of_birth: user.date_of_birth,
            phone: user.phone,
            roles,
        }
    }
}

fn validate_name(name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 128 {
        return Err(AppError::Validation("Name must be 1-128 characters".into()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = email.len() <= 254
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(AppError::Validation("Email is not valid".into()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 || password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

fn validate_phone(phone: Option<&str>) -> Result<(), AppError> {
    if phone.is_some_and(|p| p.chars().count() > 32) {
        return Err(AppError::Validation(
            "Phone must be at most 32 characters".into(),
        ));
    }
    Ok(())
}
