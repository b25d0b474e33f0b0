// handlers/protected/projects.rs - /api/law-projects
//
// Reads are open so leaders can follow the legislative pipeline. The view
// counter endpoint exists for the public-facing project pages.

use axum::{extract::Path, Extension, Json};
use uuid::Uuid;

use crate::authz::{Principal, Role};
use crate::database::manager::DatabaseManager;
use crate::database::models::LawProject;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::project_service::{self, CreateLawProject, UpdateLawProject};

fn require_staff(principal: &Principal) -> Result<(), ApiError> {
    if principal.role == Role::CommunityLeader {
        Err(ApiError::forbidden("Community leaders cannot manage law projects"))
    } else {
        Ok(())
    }
}

/// GET /api/law-projects
pub async fn list(Extension(principal): Extension<Principal>) -> ApiResult<Vec<LawProject>> {
    let pool = DatabaseManager::pool().await?;
    let projects = project_service::list(&pool, &principal).await?;
    Ok(ApiResponse::success(projects))
}

/// POST /api/law-projects
pub async fn create(
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateLawProject>,
) -> ApiResult<LawProject> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let project = project_service::create(&pool, &principal, payload).await?;
    Ok(ApiResponse::created(project))
}

/// GET /api/law-projects/:id
pub async fn get(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<LawProject> {
    let pool = DatabaseManager::pool().await?;
    let project = project_service::get(&pool, &principal, id).await?;
    Ok(ApiResponse::success(project))
}

/// PUT /api/law-projects/:id
pub async fn update(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLawProject>,
) -> ApiResult<LawProject> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let project = project_service::update(&pool, &principal, id, payload).await?;
    Ok(ApiResponse::success(project))
}

/// DELETE /api/law-projects/:id
pub async fn delete(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    project_service::remove(&pool, &principal, id).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// POST /api/law-projects/:id/view - bump the read counter
pub async fn record_view(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<LawProject> {
    let pool = DatabaseManager::pool().await?;
    let project = project_service::increment_views(&pool, &principal, id).await?;
    Ok(ApiResponse::success(project))
}
