// handlers/protected/leaders.rs - /api/leaders

use axum::{extract::Path, Extension, Json};
use uuid::Uuid;

use crate::authz::{Principal, Role};
use crate::database::manager::DatabaseManager;
use crate::database::models::Leader;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::leader_service::{self, CreateLeader, UpdateLeader};

// Leaders read their own roster but never reshape it.
fn require_staff(principal: &Principal) -> Result<(), ApiError> {
    if principal.role == Role::CommunityLeader {
        Err(ApiError::forbidden("Community leaders cannot manage leader profiles"))
    } else {
        Ok(())
    }
}

/// GET /api/leaders
pub async fn list(Extension(principal): Extension<Principal>) -> ApiResult<Vec<Leader>> {
    let pool = DatabaseManager::pool().await?;
    let leaders = leader_service::list(&pool, &principal).await?;
    Ok(ApiResponse::success(leaders))
}

/// POST /api/leaders
pub async fn create(
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateLeader>,
) -> ApiResult<Leader> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let leader = leader_service::create(&pool, &principal, payload).await?;
    Ok(ApiResponse::created(leader))
}

/// GET /api/leaders/:id
pub async fn get(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Leader> {
    let pool = DatabaseManager::pool().await?;
    let leader = leader_service::get(&pool, &principal, id).await?;
    Ok(ApiResponse::success(leader))
}

/// PUT /api/leaders/:id
pub async fn update(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLeader>,
) -> ApiResult<Leader> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let leader = leader_service::update(&pool, &principal, id, payload).await?;
    Ok(ApiResponse::success(leader))
}

/// DELETE /api/leaders/:id
pub async fn delete(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    leader_service::remove(&pool, &principal, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
