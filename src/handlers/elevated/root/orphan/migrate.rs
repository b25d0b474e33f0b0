// handlers/elevated/root/orphan/migrate.rs - POST /api/root/orphans/migrate/:tenant_id

use axum::{extract::Path, Extension};
use uuid::Uuid;

use crate::authz::Principal;
use crate::database::manager::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::migration_service::{self, MigrationOutcome};

/// Adopt every orphaned row into the given office-holder's tenant.
/// Safe to run repeatedly, a second run finds nothing left to claim.
pub async fn orphan_migrate(
    Extension(principal): Extension<Principal>,
    Path(tenant_id): Path<Uuid>,
) -> ApiResult<MigrationOutcome> {
    let pool = DatabaseManager::pool().await?;
    let outcome = migration_service::migrate_orphans(&pool, &principal, tenant_id).await?;
    Ok(ApiResponse::success(outcome))
}
