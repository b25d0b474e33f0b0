// handlers/elevated/root/orphan/stats.rs - GET /api/root/orphans

use crate::database::manager::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::migration_service::{self, OrphanCounts};

/// Per-kind counts of rows with no tenant. A non-zero total usually means
/// data imported before the office structure was set up.
pub async fn orphan_stats() -> ApiResult<OrphanCounts> {
    let pool = DatabaseManager::pool().await?;
    let counts = migration_service::orphan_counts(&pool).await?;
    Ok(ApiResponse::success(counts))
}
