use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::scoped::TenantRow;
use crate::types::EntityKind;

/// Community leader profile. Created automatically alongside every
/// community-leader account (`account_id` back-reference), or standalone for
/// leaders who never log in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Leader {
    pub id: Uuid,
    pub name: String,
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub region: String,
    pub voters_count: i32,
    pub voters_goal: i32,
    pub active: bool,
    pub account_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantRow for Leader {
    const KIND: EntityKind = EntityKind::Leader;
    const COLUMNS: &'static str = "id, name, national_id, phone, email, region, voters_count, \
         voters_goal, active, account_id, tenant_id, created_at, updated_at";

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> Option<Uuid> {
        self.tenant_id
    }
}
