use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::scoped::TenantRow;
use crate::types::EntityKind;

/// Legislative proposal tracked through its life cycle. `timeline` is an
/// append-only JSON list of dated milestones; `votes` holds the final tally
/// once voted.
///
/// `status` is one of `drafting`, `filed`, `in_committee`, `approved`,
/// `rejected`, `archived`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LawProject {
    pub id: Uuid,
    pub number: String,
    pub title: String,
    pub summary: String,
    pub full_text: Option<String>,
    pub protocol_date: NaiveDate,
    pub status: String,
    pub timeline: Value,
    pub votes: Option<Value>,
    pub pdf_url: Option<String>,
    pub views: i32,
    pub tenant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LawProject {
    pub const STATUSES: [&'static str; 6] =
        ["drafting", "filed", "in_committee", "approved", "rejected", "archived"];
}

impl TenantRow for LawProject {
    const KIND: EntityKind = EntityKind::LawProject;
    const COLUMNS: &'static str = "id, number, title, summary, full_text, protocol_date, status, \
         timeline, votes, pdf_url, views, tenant_id, created_at, updated_at";

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> Option<Uuid> {
        self.tenant_id
    }
}
