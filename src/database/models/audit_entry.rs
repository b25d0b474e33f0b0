use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One audit trail row. Pure sink data, never consulted for authorization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditEntry {
    pub id: Uuid,
    pub action: String,
    pub entity_kind: String,
    pub entity_id: Option<Uuid>,
    pub description: String,
    pub actor_id: Option<Uuid>,
    pub actor_name: Option<String>,
    pub details: Option<Value>,
    pub tenant_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
}

pub const AUDIT_COLUMNS: &str = "id, action, entity_kind, entity_id, description, actor_id, \
     actor_name, details, tenant_id, timestamp";
