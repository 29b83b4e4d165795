//! Role handlers. Every route here sits behind the bearer-token middleware.

use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;

use crate::middleware::AuthUser;
use crate::models::{Role, RoleResponse};
use crate::services::metrics::record_write;
use crate::startup::AppState;
use crate::utils::validation::{
    identifier_from_body, parse_identifier, require_identifier, require_string,
};
use crate::utils::JsonBody;

/// List every role, newest first.
///
/// GET /role/all
pub async fn list_roles(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoleResponse>>, AppError> {
    let roles = state.store.list_roles().await?;
    Ok(Json(roles.into_iter().map(RoleResponse::from).collect()))
}

/// List the caller's roles with each organization expanded.
///
/// GET /role/user
pub async fn list_user_roles(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<RoleResponse>>, AppError> {
    let user_id = parse_identifier("id", &claims.sub)?;

    let roles = state.store.list_roles_by_user(user_id).await?;
    Ok(Json(roles.into_iter().map(RoleResponse::from).collect()))
}

/// GET /role/org/:id
pub async fn list_organization_roles(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<RoleResponse>>, AppError> {
    let organization_id = parse_identifier("id", &id)?;

    let roles = state.store.list_roles_by_organization(organization_id).await?;
    Ok(Json(roles.into_iter().map(RoleResponse::from).collect()))
}

/// GET /role/:id
pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<RoleResponse>>, AppError> {
    let id = parse_identifier("id", &id)?;

    let role = state.store.find_role(id).await?;
    Ok(Json(role.map(RoleResponse::from)))
}

/// POST /role/
pub async fn create_role(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Json<RoleResponse>, AppError> {
    let user_id = require_identifier(&body, "userId")?;
    let organization_id = require_identifier(&body, "orgId")?;
    let label = require_string(&body, "role")?;

    let role = Role::new(user_id, organization_id, label);
    state.store.insert_role(&role).await?;
    record_write("roles", "create");

    tracing::info!(
        role_id = %role.id,
        user_id = %role.user_id,
        organization_id = %role.organization_id,
        "Role created"
    );

    Ok(Json(RoleResponse::from(role)))
}

/// Replace a role's label; responds with the updated record, or `null` if none matched.
///
/// PUT /role/
pub async fn update_role(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Json<Option<RoleResponse>>, AppError> {
    let role_id = require_identifier(&body, "roleId")?;
    let label = require_string(&body, "role")?;

    let role = state.store.update_role_label(role_id, &label).await?;
    if role.is_some() {
        record_write("roles", "update");
    }

    Ok(Json(role.map(RoleResponse::from)))
}

/// DELETE /role/
pub async fn delete_role(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Json<Option<RoleResponse>>, AppError> {
    let id = identifier_from_body(&body)?;

    let role = state.store.delete_role(id).await?;
    if let Some(role) = &role {
        record_write("roles", "delete");
        tracing::info!(role_id = %role.id, "Role deleted");
    }

    Ok(Json(role.map(RoleResponse::from)))
}
