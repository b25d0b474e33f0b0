// handlers/protected/accounts.rs - /api/accounts

use axum::{extract::Path, Extension, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::authz::Principal;
use crate::database::manager::DatabaseManager;
use crate::database::models::Account;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::account_service::{self, CreateAccount, UpdateAccount};

// Account management is off limits for community leaders, the one role
// that never administers other people.
fn require_manager(principal: &Principal) -> Result<(), ApiError> {
    if principal.role.manages_accounts() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Community leaders cannot manage accounts"))
    }
}

/// GET /api/accounts - roster visible to the caller's role
pub async fn list(Extension(principal): Extension<Principal>) -> ApiResult<Vec<Account>> {
    require_manager(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let accounts = account_service::list(&pool, &principal).await?;
    Ok(ApiResponse::success(accounts))
}

/// POST /api/accounts - create an account below the caller in the hierarchy
pub async fn create(
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateAccount>,
) -> ApiResult<Account> {
    require_manager(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let account = account_service::create(&pool, &principal, payload).await?;
    Ok(ApiResponse::created(account))
}

/// GET /api/accounts/:id - open to every authenticated role, the service
/// decides what the caller may see
pub async fn get(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Account> {
    let pool = DatabaseManager::pool().await?;
    let account = account_service::get(&pool, &principal, id).await?;
    Ok(ApiResponse::success(account))
}

/// PUT /api/accounts/:id
pub async fn update(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAccount>,
) -> ApiResult<Account> {
    require_manager(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let account = account_service::update(&pool, &principal, id, payload).await?;
    Ok(ApiResponse::success(account))
}

/// DELETE /api/accounts/:id
pub async fn delete(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    require_manager(&principal)?;
    let pool = DatabaseManager::pool().await?;
    account_service::remove(&pool, &principal, id).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// GET /api/accounts/check/email/:email - availability probe for signup forms
pub async fn check_email(
    Extension(principal): Extension<Principal>,
    Path(email): Path<String>,
) -> ApiResult<Value> {
    require_manager(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let exists = account_service::email_exists(&pool, &email).await?;
    Ok(ApiResponse::success(json!({ "exists": exists })))
}

/// GET /api/accounts/check/national-id/:national_id
pub async fn check_national_id(
    Extension(principal): Extension<Principal>,
    Path(national_id): Path<String>,
) -> ApiResult<Value> {
    require_manager(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let exists = account_service::national_id_exists(&pool, &national_id).await?;
    Ok(ApiResponse::success(json!({ "exists": exists })))
}
