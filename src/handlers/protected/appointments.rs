// handlers/protected/appointments.rs - /api/appointments
//
// Everyone reads the office agenda, only staff shape it.

use axum::{extract::Path, Extension, Json};
use uuid::Uuid;

use crate::authz::{Principal, Role};
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::appointment_service::{
    self, AppointmentView, CreateAppointment, UpdateAppointment,
};

fn require_staff(principal: &Principal) -> Result<(), ApiError> {
    if principal.role == Role::CommunityLeader {
        Err(ApiError::forbidden("Community leaders cannot manage the agenda"))
    } else {
        Ok(())
    }
}

/// GET /api/appointments
pub async fn list(Extension(principal): Extension<Principal>) -> ApiResult<Vec<AppointmentView>> {
    let pool = DatabaseManager::pool().await?;
    let appointments = appointment_service::list(&pool, &principal).await?;
    Ok(ApiResponse::success(appointments))
}

/// POST /api/appointments
pub async fn create(
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateAppointment>,
) -> ApiResult<AppointmentView> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let appointment = appointment_service::create(&pool, &principal, payload).await?;
    Ok(ApiResponse::created(appointment))
}

/// GET /api/appointments/:id
pub async fn get(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<AppointmentView> {
    let pool = DatabaseManager::pool().await?;
    let appointment = appointment_service::get(&pool, &principal, id).await?;
    Ok(ApiResponse::success(appointment))
}

/// PUT /api/appointments/:id
pub async fn update(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAppointment>,
) -> ApiResult<AppointmentView> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    let appointment = appointment_service::update(&pool, &principal, id, payload).await?;
    Ok(ApiResponse::success(appointment))
}

/// DELETE /api/appointments/:id
pub async fn delete(
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    require_staff(&principal)?;
    let pool = DatabaseManager::pool().await?;
    appointment_service::remove(&pool, &principal, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
