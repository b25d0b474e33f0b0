// handlers/elevated/root/tenant/list.rs - GET /api/root/tenants

use crate::database::manager::DatabaseManager;
use crate::database::models::Account;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::account_service;

/// Every office-holder account, one per tenant. The account id doubles as
/// the tenant id everywhere else in the system.
pub async fn tenant_list() -> ApiResult<Vec<Account>> {
    let pool = DatabaseManager::pool().await?;
    let tenants = account_service::list_office_holders(&pool).await?;
    Ok(ApiResponse::success(tenants))
}
