// handlers/protected/visits.rs - /api/visits
//
// Open to every authenticated role, same policy as voters. Responses carry
// the joined voter and leader names for list rendering.

use axum::{extract::Path, Extension, Json};
use uuid::Uuid;

use crate::authz::Principal;
use crate::database::manager::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::visit_service::{self, CreateVisit, UpdateVisit, VisitView};

/// GET /api/visits
pub async fn list(Extension(principal): Extension<Principal>) -> ApiResult<Vec<VisitView>> {
    let pool = DatabaseManager::pool().await?;
    let visits = visit_service::list(&pool, &principal).await?;
    Ok(ApiResponse::success(visits))
}

/// POST /api/visits
pub async fn create(
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateVisit>,
) -> ApiResult<VisitView> {
    let pool = DatabaseManager::pool().await?;
    let visit = visit_service::create(&pool, &principal, payload).await?;
    Ok(ApiResponse::created(visit))
}

/// GET /api/visits/:id
pub async fn get(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<VisitView> {
    let pool = DatabaseManager::pool().await?;
    let visit = visit_service::get(&pool, &principal, id).await?;
    Ok(ApiResponse::success(visit))
}

/// PUT /api/visits/:id
pub async fn update(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVisit>,
) -> ApiResult<VisitView> {
    let pool = DatabaseManager::pool().await?;
    let visit = visit_service::update(&pool, &principal, id, payload).await?;
    Ok(ApiResponse::success(visit))
}

/// DELETE /api/visits/:id
pub async fn delete(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    visit_service::remove(&pool, &principal, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
