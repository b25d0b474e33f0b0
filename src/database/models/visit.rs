use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::scoped::TenantRow;
use crate::types::EntityKind;

/// Field visit to a constituent. `leader_id` may be null when the
/// reconciliation step (see leader_service) finds no plausible leader.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Visit {
    pub id: Uuid,
    pub voter_id: Uuid,
    pub leader_id: Option<Uuid>,
    pub date: DateTime<Utc>,
    pub objective: String,
    pub result: Option<String>,
    pub next_steps: Option<String>,
    pub photos: Option<Vec<String>>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub tenant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TenantRow for Visit {
    const KIND: EntityKind = EntityKind::Visit;
    const COLUMNS: &'static str = "id, voter_id, leader_id, date, objective, result, next_steps, \
         photos, latitude, longitude, tenant_id, created_at";

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> Option<Uuid> {
        self.tenant_id
    }
}
