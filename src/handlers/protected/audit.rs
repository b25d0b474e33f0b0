// handlers/protected/audit.rs - /api/audit
//
// Read-only trail plus one destructive clear. Every read is filtered to the
// caller's scope by the service, admins see everything.

use axum::{
    extract::{Path, Query},
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::authz::{Principal, Role};
use crate::database::manager::DatabaseManager;
use crate::database::models::AuditEntry;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::audit_service;
use crate::types::{AuditAction, EntityKind};

#[derive(Debug, Deserialize)]
pub struct AuditListQuery {
    pub limit: Option<i64>,
}

/// GET /api/audit?limit=N - newest entries first
pub async fn list(
    Extension(principal): Extension<Principal>,
    Query(query): Query<AuditListQuery>,
) -> ApiResult<Vec<AuditEntry>> {
    let pool = DatabaseManager::pool().await?;
    let entries = audit_service::list(&pool, principal.scope(), query.limit).await?;
    Ok(ApiResponse::success(entries))
}

/// GET /api/audit/entity/:kind
pub async fn list_by_entity(
    Extension(principal): Extension<Principal>,
    Path(kind): Path<String>,
) -> ApiResult<Vec<AuditEntry>> {
    let kind: EntityKind = kind.parse().map_err(ApiError::bad_request)?;
    let pool = DatabaseManager::pool().await?;
    let entries = audit_service::list_by_entity(&pool, principal.scope(), kind).await?;
    Ok(ApiResponse::success(entries))
}

/// GET /api/audit/action/:action
pub async fn list_by_action(
    Extension(principal): Extension<Principal>,
    Path(action): Path<String>,
) -> ApiResult<Vec<AuditEntry>> {
    let action: AuditAction = action.parse().map_err(ApiError::bad_request)?;
    let pool = DatabaseManager::pool().await?;
    let entries = audit_service::list_by_action(&pool, principal.scope(), action).await?;
    Ok(ApiResponse::success(entries))
}

/// DELETE /api/audit - clear the trail visible to the caller
pub async fn clear(Extension(principal): Extension<Principal>) -> ApiResult<Value> {
    match principal.role {
        Role::Admin | Role::OfficeHolder => {}
        _ => return Err(ApiError::forbidden("Only admins and office-holders can clear the audit trail")),
    }
    let pool = DatabaseManager::pool().await?;
    let removed = audit_service::clear(&pool, principal.scope()).await?;
    Ok(ApiResponse::success(json!({ "removed": removed })))
}
