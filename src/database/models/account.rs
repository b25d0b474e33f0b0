use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::scoped::TenantRow;
use crate::types::EntityKind;

/// A login-capable account. Role is stored as text and parsed into
/// [`crate::authz::Role`] at the trust boundary (login), never assumed valid
/// elsewhere.
///
/// `tenant_id` points at the owning office-holder account: self for
/// office-holders, the employer for aides and community leaders, null for
/// admins and for legacy rows awaiting migration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub region: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub active: bool,
    pub tenant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantRow for Account {
    const KIND: EntityKind = EntityKind::Account;
    const COLUMNS: &'static str = "id, name, email, password_hash, national_id, phone, role, \
         region, city, state, active, tenant_id, created_at, updated_at";

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> Option<Uuid> {
        self.tenant_id
    }
}
