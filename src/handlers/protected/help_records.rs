// handlers/protected/help_records.rs - /api/help-records
//
// Staff only. Community leaders are locked out of the whole surface, reads
// included, because help records carry casework details about constituents.

use axum::{extract::Path, Extension, Json};
use uuid::Uuid;

use crate::authz::{Principal, Role};
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::help_record_service::{self, CreateHelpRecord, HelpRecordView, UpdateHelpRecord};

fn require_staff(principal: &Principal) -> Result<(), ApiError> {
    if principal.role == Role::CommunityLeader {
        Err(ApiError::forbidden("Community leaders cannot access help records"))
    } else {
        Ok(())
    }
}

/// GET /api/help-records
pub async fn list(Extension(principal): Extension<Principal>) -> ApiResult<Vec<HelpRecordView>> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let records = help_record_service::list(&pool, &principal).await?;
    Ok(ApiResponse::success(records))
}

/// POST /api/help-records
pub async fn create(
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateHelpRecord>,
) -> ApiResult<HelpRecordView> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let record = help_record_service::create(&pool, &principal, payload).await?;
    Ok(ApiResponse::created(record))
}

/// GET /api/help-records/:id
pub async fn get(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<HelpRecordView> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let record = help_record_service::get(&pool, &principal, id).await?;
    Ok(ApiResponse::success(record))
}

/// PUT /api/help-records/:id
pub async fn update(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateHelpRecord>,
) -> ApiResult<HelpRecordView> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let record = help_record_service::update(&pool, &principal, id, payload).await?;
    Ok(ApiResponse::success(record))
}

/// DELETE /api/help-records/:id
pub async fn delete(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    help_record_service::remove(&pool, &principal, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
