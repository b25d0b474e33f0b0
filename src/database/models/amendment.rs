use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::scoped::TenantRow;
use crate::types::EntityKind;

/// Budget amendment directed by the office. `status` is one of `approved`,
/// `in_execution`, `executed`, `cancelled`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Amendment {
    pub id: Uuid,
    pub code: String,
    pub value: Decimal,
    pub destination: String,
    pub objective: String,
    pub status: String,
    pub execution_percentage: i32,
    pub documents: Option<Vec<String>>,
    pub photos: Option<Vec<String>>,
    pub tenant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Amendment {
    pub const STATUSES: [&'static str; 4] = ["approved", "in_execution", "executed", "cancelled"];
}

impl TenantRow for Amendment {
    const KIND: EntityKind = EntityKind::Amendment;
    const COLUMNS: &'static str = "id, code, value, destination, objective, status, \
         execution_percentage, documents, photos, tenant_id, created_at, updated_at";

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> Option<Uuid> {
        self.tenant_id
    }
}
