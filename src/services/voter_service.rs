use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::authz::{assign_tenant, Principal};
use crate::database::models::Voter;
use crate::database::scoped::TenantRow;
use crate::database::ScopedRepository;
use crate::error::ApiError;
use crate::services::audit_service::{self, NewAuditEntry};
use crate::types::{AuditAction, EntityKind};

#[derive(Debug, Deserialize)]
pub struct CreateVoter {
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
    pub votes_count: Option<i32>,
    pub leader_id: Option<Uuid>,
    pub notes: Option<String>,
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateVoter {
    pub name: Option<String>,
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
    pub votes_count: Option<i32>,
    pub leader_id: Option<Uuid>,
    pub notes: Option<String>,
}

fn repo(pool: &PgPool) -> ScopedRepository<Voter> {
    ScopedRepository::new(pool.clone())
}

pub async fn create(
    pool: &PgPool,
    principal: &Principal,
    payload: CreateVoter,
) -> Result<Voter, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("Voter name is required"));
    }
    let tenant_id = assign_tenant(principal, payload.tenant_id)?;

    // A linked leader has to belong to the same office
    if let Some(leader_id) = payload.leader_id {
        ensure_leader_in_tenant(pool, leader_id, tenant_id).await?;
    }

    let id = Uuid::new_v4();
    let sql = format!(
        "INSERT INTO voters \
         (id, name, national_id, voter_registration, birth_date, phone, street, number, \
          complement, neighborhood, postal_code, city, state, latitude, longitude, \
          votes_count, leader_id, notes, tenant_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19) \
         RETURNING {}",
        Voter::COLUMNS
    );
    let voter = sqlx::query_as::<_, Voter>(&sql)
        .bind(id)
        .bind(payload.name.trim())
        .bind(&payload.national_id)
        .bind(&payload.voter_registration)
        .bind(payload.birth_date)
        .bind(&payload.phone)
        .bind(&payload.street)
        .bind(&payload.number)
        .bind(&payload.complement)
        .bind(&payload.neighborhood)
        .bind(&payload.postal_code)
        .bind(&payload.city)
        .bind(&payload.state)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .bind(payload.votes_count.unwrap_or(0))
        .bind(payload.leader_id)
        .bind(&payload.notes)
        .bind(tenant_id)
        .fetch_one(pool)
        .await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Create,
            EntityKind::Voter,
            format!("Voter created: {}", voter.name),
        )
        .entity(voter.id)
        .tenant(voter.tenant_id)
        .by(principal),
    )
    .await;

    Ok(voter)
}

pub async fn list(pool: &PgPool, principal: &Principal) -> Result<Vec<Voter>, ApiError> {
    let voters = repo(pool).list(principal.scope()).await?;
    Ok(voters)
}

pub async fn get(pool: &PgPool, principal: &Principal, id: Uuid) -> Result<Voter, ApiError> {
    repo(pool).fetch_scoped(principal, id).await
}

pub async fn update(
    pool: &PgPool,
    principal: &Principal,
    id: Uuid,
    payload: UpdateVoter,
) -> Result<Voter, ApiError> {
    let current = repo(pool).fetch_scoped(principal, id).await?;

    if let (Some(leader_id), Some(tenant_id)) = (payload.leader_id, current.tenant_id) {
        ensure_leader_in_tenant(pool, leader_id, tenant_id).await?;
    }

    let sql = format!(
        "UPDATE voters SET \
         name = COALESCE($2, name), \
         national_id = COALESCE($3, national_id), \
         voter_registration = COALESCE($4, voter_registration), \
         birth_date = COALESCE($5, birth_date), \
         phone = COALESCE($6, phone), \
         street = COALESCE($7, street), \
         number = COALESCE($8, number), \
         complement = COALESCE($9, complement), \
         neighborhood = COALESCE($10, neighborhood), \
         postal_code = COALESCE($11, postal_code), \
         city = COALESCE($12, city), \
         state = COALESCE($13, state), \
         latitude = COALESCE($14, latitude), \
         longitude = COALESCE($15, longitude), \
         votes_count = COALESCE($16, votes_count), \
         leader_id = COALESCE($17, leader_id), \
         notes = COALESCE($18, notes), \
         updated_at = now() \
         WHERE id = $1 \
         RETURNING {}",
        Voter::COLUMNS
    );
    let voter = sqlx::query_as::<_, Voter>(&sql)
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.national_id)
        .bind(&payload.voter_registration)
        .bind(payload.birth_date)
        .bind(&payload.phone)
        .bind(&payload.street)
        .bind(&payload.number)
        .bind(&payload.complement)
        .bind(&payload.neighborhood)
        .bind(&payload.postal_code)
        .bind(&payload.city)
        .bind(&payload.state)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .bind(payload.votes_count)
        .bind(payload.leader_id)
        .bind(&payload.notes)
        .fetch_one(pool)
        .await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Update,
            EntityKind::Voter,
            format!("Voter updated: {}", voter.name),
        )
        .entity(voter.id)
        .tenant(voter.tenant_id)
        .by(principal),
    )
    .await;

    Ok(voter)
}

pub async fn remove(pool: &PgPool, principal: &Principal, id: Uuid) -> Result<(), ApiError> {
    let voter = repo(pool).delete_scoped(principal, id).await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Delete,
            EntityKind::Voter,
            format!("Voter deleted: {}", voter.name),
        )
        .entity(voter.id)
        .tenant(voter.tenant_id)
        .by(principal),
    )
    .await;

    Ok(())
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
