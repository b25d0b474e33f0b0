// handlers/elevated/root/account/bind.rs - POST /api/root/accounts/:id/bind

use axum::{extract::Path, Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::authz::Principal;
use crate::database::manager::DatabaseManager;
use crate::database::models::Account;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::migration_service;

#[derive(Debug, Deserialize)]
pub struct BindRequest {
    /// Target office. Office-holders always self-bind, so for them this may
    /// only be omitted or their own id.
    pub tenant_id: Option<Uuid>,
}

/// Rebind one account's tenant by hand. The repair tool for accounts that
/// predate their office or were imported with the wrong binding.
pub async fn account_bind(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BindRequest>,
) -> ApiResult<Account> {
    let pool = DatabaseManager::pool().await?;
    let account =
        migration_service::bind_account(&pool, &principal, id, payload.tenant_id).await?;
    Ok(ApiResponse::success(account))
}
