use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::scoped::TenantRow;
use crate::types::EntityKind;

/// Casework request opened on behalf of a constituent.
///
/// `status` is one of `pending`, `in_progress`, `completed`, `cancelled`.
/// `category` is one of `health`, `education`, `social_assistance`,
/// `infrastructure`, `employment`, `documentation`, `other`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HelpRecord {
    pub id: Uuid,
    pub voter_id: Uuid,
    pub leader_id: Option<Uuid>,
    pub category: String,
    pub description: Option<String>,
    pub status: String,
    pub responsible_id: Option<Uuid>,
    pub documents: Option<Vec<String>>,
    pub notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub tenant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HelpRecord {
    pub const STATUSES: [&'static str; 4] = ["pending", "in_progress", "completed", "cancelled"];
    pub const CATEGORIES: [&'static str; 7] = [
        "health",
        "education",
        "social_assistance",
        "infrastructure",
        "employment",
        "documentation",
        "other",
    ];
}

impl TenantRow for HelpRecord {
    const KIND: EntityKind = EntityKind::HelpRecord;
    const COLUMNS: &'static str = "id, voter_id, leader_id, category, description, status, \
         responsible_id, documents, notes, completed_at, tenant_id, created_at, updated_at";

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> Option<Uuid> {
        self.tenant_id
    }
}
