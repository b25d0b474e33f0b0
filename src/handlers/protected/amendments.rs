// handlers/protected/amendments.rs - /api/amendments
//
// Budget amendments are staff-only end to end, reads included.

use axum::{extract::Path, Extension, Json};
use uuid::Uuid;

use crate::authz::{Principal, Role};
use crate::database::manager::DatabaseManager;
use crate::database::models::Amendment;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::amendment_service::{self, CreateAmendment, UpdateAmendment};

fn require_staff(principal: &Principal) -> Result<(), ApiError> {
    if principal.role == Role::CommunityLeader {
        Err(ApiError::forbidden("Community leaders cannot access amendments"))
    } else {
        Ok(())
    }
}

/// GET /api/amendments
pub async fn list(Extension(principal): Extension<Principal>) -> ApiResult<Vec<Amendment>> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let amendments = amendment_service::list(&pool, &principal).await?;
    Ok(ApiResponse::success(amendments))
}

/// POST /api/amendments
pub async fn create(
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateAmendment>,
) -> ApiResult<Amendment> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let amendment = amendment_service::create(&pool, &principal, payload).await?;
    Ok(ApiResponse::created(amendment))
}

/// GET /api/amendments/:id
pub async fn get(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Amendment> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let amendment = amendment_service::get(&pool, &principal, id).await?;
    Ok(ApiResponse::success(amendment))
}

/// PUT /api/amendments/:id
pub async fn update(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAmendment>,
) -> ApiResult<Amendment> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let amendment = amendment_service::update(&pool, &principal, id, payload).await?;
    Ok(ApiResponse::success(amendment))
}

/// DELETE /api/amendments/:id
pub async fn delete(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    amendment_service::remove(&pool, &principal, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
