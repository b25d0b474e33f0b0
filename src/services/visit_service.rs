use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::authz::{assign_tenant, authorize_record_access, Principal};
use crate::database::models::{Visit, Voter};
use crate::database::scoped::TenantRow;
use crate::error::ApiError;
use crate::services::audit_service::{self, NewAuditEntry};
use crate::services::leader_service::{self, LeaderReference};
use crate::types::{AuditAction, EntityKind};

#[derive(Debug, Deserialize)]
pub struct CreateVisit {
    pub voter_id: Uuid,
    pub leader_id: Option<Uuid>,
    /// Acting account hint, used when the client knows who performed the
    /// visit but not which leader profile they map to.
    pub account_id: Option<Uuid>,
    pub date: Option<DateTime<Utc>>,
    pub objective: String,
    pub result: Option<String>,
    pub next_steps: Option<String>,
    pub photos: Option<Vec<String>>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateVisit {
    pub leader_id: Option<Uuid>,
    pub date: Option<DateTime<Utc>>,
    pub objective: Option<String>,
    pub result: Option<String>,
    pub next_steps: Option<String>,
    pub photos: Option<Vec<String>>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
}

/// Visit row joined with the names clients render in lists.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VisitView {
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
    pub voter_name: String,
    pub leader_name: String,
}

const VIEW_SELECT: &str = "SELECT v.id, v.voter_id, v.leader_id, v.date, v.objective, v.result, \
     v.next_steps, v.photos, v.latitude, v.longitude, v.tenant_id, v.created_at, \
     COALESCE(vt.name, '') AS voter_name, COALESCE(l.name, '') AS leader_name \
     FROM visits v \
     LEFT JOIN voters vt ON vt.id = v.voter_id \
     LEFT JOIN leaders l ON l.id = v.leader_id";

pub async fn create(
    pool: &PgPool,
    principal: &Principal,
    payload: CreateVisit,
) -> Result<VisitView, ApiError> {
    if payload.objective.trim().is_empty() {
        return Err(ApiError::bad_request("Visit objective is required"));
    }
    let tenant_id = assign_tenant(principal, payload.tenant_id)?;

    let voter = fetch_voter_in_tenant(pool, payload.voter_id, tenant_id).await?;

    let leader = leader_service::reconcile_reference(
        pool,
        tenant_id,
        LeaderReference { leader_id: payload.leader_id, account_id: payload.account_id },
        voter.leader_id,
    )
    .await?;

    let id = Uuid::new_v4();
    let sql = format!(
        "INSERT INTO visits \
         (id, voter_id, leader_id, date, objective, result, next_steps, photos, latitude, longitude, tenant_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING {}",
        Visit::COLUMNS
    );
    let visit = sqlx::query_as::<_, Visit>(&sql)
        .bind(id)
        .bind(voter.id)
        .bind(leader.as_ref().map(|l| l.id))
        .bind(payload.date.unwrap_or_else(Utc::now))
        .bind(payload.objective.trim())
        .bind(&payload.result)
        .bind(&payload.next_steps)
        .bind(&payload.photos)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .bind(tenant_id)
        .fetch_one(pool)
        .await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Create,
            EntityKind::Visit,
            format!("Visit recorded for voter: {}", voter.name),
        )
        .entity(visit.id)
        .tenant(visit.tenant_id)
        .by(principal),
    )
    .await;

    get(pool, principal, visit.id).await
}

pub async fn list(pool: &PgPool, principal: &Principal) -> Result<Vec<VisitView>, ApiError> {
    let views = match principal.scope().filter() {
        None => {
            let sql = format!("{} ORDER BY v.date DESC", VIEW_SELECT);
            sqlx::query_as::<_, VisitView>(&sql).fetch_all(pool).await?
        }
        Some(tenant_id) => {
            let sql = format!("{} WHERE v.tenant_id = $1 ORDER BY v.date DESC", VIEW_SELECT);
            sqlx::query_as::<_, VisitView>(&sql).bind(tenant_id).fetch_all(pool).await?
        }
    };
    Ok(views)
}

pub async fn get(pool: &PgPool, principal: &Principal, id: Uuid) -> Result<VisitView, ApiError> {
    let sql = format!("{} WHERE v.id = $1", VIEW_SELECT);
    let view = sqlx::query_as::<_, VisitView>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Visit not found"))?;
    authorize_record_access(principal, view.tenant_id)?;
    Ok(view)
}

pub async fn update(
    pool: &PgPool,
    principal: &Principal,
    id: Uuid,
    payload: UpdateVisit,
) -> Result<VisitView, ApiError> {
    let current = get(pool, principal, id).await?;

    if let (Some(leader_id), Some(tenant_id)) = (payload.leader_id, current.tenant_id) {
        ensure_leader_in_tenant(pool, leader_id, tenant_id).await?;
    }

    sqlx::query(
        "UPDATE visits SET \
         leader_id = COALESCE($2, leader_id), \
         date = COALESCE($3, date), \
         objective = COALESCE($4, objective), \
         result = COALESCE($5, result), \
         next_steps = COALESCE($6, next_steps), \
         photos = COALESCE($7, photos), \
         latitude = COALESCE($8, latitude), \
         longitude = COALESCE($9, longitude) \
         WHERE id = $1",
    )
    .bind(id)
    .bind(payload.leader_id)
    .bind(payload.date)
    .bind(&payload.objective)
    .bind(&payload.result)
    .bind(&payload.next_steps)
    .bind(&payload.photos)
    .bind(payload.latitude)
    .bind(payload.longitude)
    .execute(pool)
    .await?;

    let view = get(pool, principal, id).await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Update,
            EntityKind::Visit,
            format!("Visit updated for voter: {}", view.voter_name),
        )
        .entity(view.id)
        .tenant(view.tenant_id)
        .by(principal),
    )
    .await;

    Ok(view)
}

pub async fn remove(pool: &PgPool, principal: &Principal, id: Uuid) -> Result<(), ApiError> {
    let view = get(pool, principal, id).await?;

    sqlx::query("DELETE FROM visits WHERE id = $1").bind(id).execute(pool).await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Delete,
            EntityKind::Visit,
            format!("Visit deleted for voter: {}", view.voter_name),
        )
        .entity(view.id)
        .tenant(view.tenant_id)
        .by(principal),
    )
    .await;

    Ok(())
}

async fn fetch_voter_in_tenant(
    pool: &PgPool,
    voter_id: Uuid,
    tenant_id: Uuid,
) -> Result<Voter, ApiError> {
    let sql = format!("SELECT {} FROM voters WHERE id = $1 AND tenant_id = $2", Voter::COLUMNS);
    sqlx::query_as::<_, Voter>(&sql)
        .bind(voter_id)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| {
            ApiError::not_found("Voter not found, refresh the voter list and try again")
        })
}

async fn ensure_leader_in_tenant(
    pool: &PgPool,
    leader_id: Uuid,
    tenant_id: Uuid,
) -> Result<(), ApiError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM leaders WHERE id = $1 AND tenant_id = $2")
            .bind(leader_id)
            .bind(tenant_id)
            .fetch_one(pool)
            .await?;
    if count == 0 {
        return Err(ApiError::bad_request("Leader does not belong to this office"));
    }
    Ok(())
}
