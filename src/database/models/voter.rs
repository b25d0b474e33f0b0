use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::scoped::TenantRow;
use crate::types::EntityKind;

/// Registered constituent. Optionally linked to the community leader who
/// brought them in; coordinates feed the outreach heat map.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Voter {
    pub id: Uuid,
    pub name: String,
    pub national_id: Option<String>,
    pub voter_registration: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub votes_count: i32,
    pub leader_id: Option<Uuid>,
    pub notes: Option<String>,
    pub tenant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantRow for Voter {
    const KIND: EntityKind = EntityKind::Voter;
    const COLUMNS: &'static str = "id, name, national_id, voter_registration, birth_date, phone, \
         street, number, complement, neighborhood, postal_code, city, state, latitude, longitude, \
         votes_count, leader_id, notes, tenant_id, created_at, updated_at";

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> Option<Uuid> {
        self.tenant_id
    }
}
