// handlers/protected/voters.rs - /api/voters
//
// Open to every authenticated role. Community leaders work their own voter
// base daily, the tenant scope in the service keeps them inside it.

use axum::{extract::Path, Extension, Json};
use uuid::Uuid;

use crate::authz::Principal;
use crate::database::manager::DatabaseManager;
use crate::database::models::Voter;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::voter_service::{self, CreateVoter, UpdateVoter};

/// GET /api/voters
pub async fn list(Extension(principal): Extension<Principal>) -> ApiResult<Vec<Voter>> {
    let pool = DatabaseManager::pool().await?;
    let voters = voter_service::list(&pool, &principal).await?;
    Ok(ApiResponse::success(voters))
}

/// POST /api/voters
pub async fn create(
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateVoter>,
) -> ApiResult<Voter> {
    let pool = DatabaseManager::pool().await?;
    let voter = voter_service::create(&pool, &principal, payload).await?;
    Ok(ApiResponse::created(voter))
}

/// GET /api/voters/:id
pub async fn get(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Voter> {
    let pool = DatabaseManager::pool().await?;
    let voter = voter_service::get(&pool, &principal, id).await?;
    Ok(ApiResponse::success(voter))
}

/// PUT /api/voters/:id
pub async fn update(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVoter>,
) -> ApiResult<Voter> {
    let pool = DatabaseManager::pool().await?;
    let voter = voter_service::update(&pool, &principal, id, payload).await?;
    Ok(ApiResponse::success(voter))
}

/// DELETE /api/voters/:id
pub async fn delete(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    voter_service::remove(&pool, &principal, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
