//! Role-level permission gate and the table that binds it to routes.

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::entity::role;
use crate::error::AppError;
use crate::extractors::auth::authenticate;
use crate::state::AppState;

/// Minimum level that grants read access.
pub const READ_LEVEL: i32 = 2;
/// The only level that grants create/update/delete.
pub const WRITE_LEVEL: i32 = 3;

/// Protected resource families, one level column each on `roles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Projects,
    Genres,
    AgeCategories,
    Types,
    Users,
    Roles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl Resource {
    fn level(self, role: &role::Model) -> i32 {
        match self {
            Self::Projects => role.projects,
            Self::Genres => role.genres,
            Self::AgeCategories => role.age_categories,
            Self::Types => role.types,
            Self::Users => role.users,
            Self::Roles => role.roles,
        }
    }
}

impl Access {
    fn allows(self, level: i32) -> bool {
        match self {
            Self::Read => level >= READ_LEVEL,
            Self::Write => level == WRITE_LEVEL,
        }
    }
}

/// True if any held role grants `access` on `resource`. Deny by default.
pub fn can_do(roles: &[role::Model], resource: Resource, access: Access) -> bool {
    roles
        .iter()
        .any(|role| access.allows(resource.level(role)))
}

/// One gated route: HTTP method and axum route pattern.
pub struct RoutePermission {
    pub method: &'static str,
    pub path: &'static str,
    pub resource: Resource,
    pub access: Access,
}

const fn gate(
    method: &'static str,
    path: &'static str,
    resource: Resource,
    access: Access,
) -> RoutePermission {
    RoutePermission {
        method,
        path,
        resource,
        access,
    }
}

use Access::{Read, Write};
use Resource::*;

/// Every permission-gated route. Routes absent here are either public or
/// scoped to the caller's own account.
pub const ROUTE_PERMISSIONS: &[RoutePermission] = &[
    gate("GET", "/v1/users", Users, Read),
    gate("GET", "/v1/users/{id}", Users, Read),
    gate("PUT", "/v1/users/{id}", Users, Write),
    gate("DELETE", "/v1/users/{id}", Users, Write),
    gate("GET", "/v1/roles", Roles, Read),
    gate("POST", "/v1/roles", Roles, Write),
    gate("GET", "/v1/roles/{id}", Roles, Read),
    gate("PUT", "/v1/roles/{id}", Roles, Write),
    gate("DELETE", "/v1/roles/{id}", Roles, Write),
    gate("GET", "/v1/genres", Genres, Read),
    gate("POST", "/v1/genres", Genres, Write),
    gate("GET", "/v1/genres/{id}", Genres, Read),
    gate("PUT", "/v1/genres/{id}", Genres, Write),
    gate("DELETE", "/v1/genres/{id}", Genres, Write),
    gate("GET", "/v1/age-categories", AgeCategories, Read),
    gate("POST", "/v1/age-categories", AgeCategories, Write),
    gate("GET", "/v1/age-categories/{id}", AgeCategories, Read),
    gate("PUT", "/v1/age-categories/{id}", AgeCategories, Write),
    gate("DELETE", "/v1/age-categories/{id}", AgeCategories, Write),
    gate("GET", "/v1/types", Types, Read),
    gate("POST", "/v1/types", Types, Write),
    gate("GET", "/v1/types/{id}", Types, Read),
    gate("PUT", "/v1/types/{id}", Types, Write),
    gate("DELETE", "/v1/types/{id}", Types, Write),
    gate("GET", "/v1/projects", Projects, Read),
    gate("POST", "/v1/projects", Projects, Write),
    gate("GET", "/v1/projects/search", Projects, Read),
    gate("GET", "/v1/projects/{id}", Projects, Read),
    gate("PUT", "/v1/projects/{id}", Projects, Write),
    gate("POST", "/v1/projects/{id}/cover", Projects, Write),
    gate("PATCH", "/v1/projects/{id}/cover", Projects, Write),
    gate("POST", "/v1/projects/images", Projects, Write),
    gate("GET", "/v1/projects/images/{id}", Projects, Read),
    gate("DELETE", "/v1/projects/images/{id}", Projects, Write),
    gate("GET", "/v1/projects/images/show/{id}", Projects, Read),
    gate("POST", "/v1/projects/videos", Projects, Write),
    gate("GET", "/v1/projects/videos/{id}", Projects, Read),
    gate("DELETE", "/v1/projects/videos/{id}", Projects, Write),
    gate("GET", "/v1/projects/videos/play/{id}", Projects, Read),
];

/// Look up the requirement for a matched route.
pub fn required_for(method: &str, path: &str) -> Option<(Resource, Access)> {
    ROUTE_PERMISSIONS
        .iter()
        .find(|p| p.method == method && p.path == path)
        .map(|p| (p.resource, p.access))
}

/// Route layer: authenticate and gate table-listed routes before the
/// handler runs. The resolved identity is left in the request extensions.
pub async fn enforce(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let required = request
        .extensions()
        .get::<MatchedPath>()
        .and_then(|path| required_for(request.method().as_str(), path.as_str()));

    if let Some((resource, access)) = required {
        let identity = authenticate(&state, request.headers()).await?;
        if !can_do(&identity.roles, resource, access) {
            tracing::debug!(
                user_id = identity.user_id,
                ?resource,
                ?access,
                "Permission denied"
            );
            return Err(AppError::PermissionDenied);
        }
        request.extensions_mut().insert(identity);
    }

    Ok(next.run(request).await)
}
