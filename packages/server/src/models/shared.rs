use std::collections::HashSet;

use serde::Serialize;

use crate::error::AppError;

/// Body returned when a resource is created.
#[derive(Serialize, utoipa::ToSchema)]
pub struct IdResponse {
    /// ID of the newly created resource.
    #[schema(example = 42)]
    pub id: i32,
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Validate a title string: trimmed, 1-256 characters.
pub fn validate_title(title: &str, field: &str) -> Result<(), AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 256 {
        return Err(AppError::Validation(format!(
            "{field} must be 1-256 characters"
        )));
    }
    Ok(())
}

/// Validate a list of referenced ids and drop duplicates, keeping first
/// occurrence order.
pub fn normalize_ids(ids: &[i32], field: &str) -> Result<Vec<i32>, AppError> {
    if ids.len() > 100 {
        return Err(AppError::Validation(format!(
            "{field} must contain at most 100 ids"
        )));
    }
    if ids.iter().any(|&id| id <= 0) {
        return Err(AppError::Validation(format!(
            "{field} must contain only positive ids"
        )));
    }
    let mut seen = HashSet::new();
    Ok(ids.iter().copied().filter(|id| seen.insert(*id)).collect())
}
