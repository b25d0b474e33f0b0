use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::scoped::TenantRow;
use crate::types::EntityKind;

/// Agenda entry for the office: meetings, field actions, calls.
///
/// `kind` is one of `commitment`, `action`, `meeting`, `visit`, `call`,
/// `other`; `status` one of `scheduled`, `in_progress`, `completed`,
/// `cancelled`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub kind: String,
    pub status: String,
    pub date: NaiveDate,
    pub time: String,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
    pub voter_id: Option<Uuid>,
    pub leader_id: Option<Uuid>,
    pub responsible_id: Option<Uuid>,
    pub notes: Option<String>,
    /// Client-managed reminder list, stored as given.
    pub reminders: Value,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub tenant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub const KINDS: [&'static str; 6] = ["commitment", "action", "meeting", "visit", "call", "other"];
    pub const STATUSES: [&'static str; 4] = ["scheduled", "in_progress", "completed", "cancelled"];
}

impl TenantRow for Appointment {
    const KIND: EntityKind = EntityKind::Appointment;
    const COLUMNS: &'static str = "id, title, description, kind, status, date, time, \
         duration_minutes, location, voter_id, leader_id, responsible_id, notes, reminders, \
         completed, completed_at, tenant_id, created_at, updated_at";

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> Option<Uuid> {
        self.tenant_id
    }
}
