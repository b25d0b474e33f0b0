use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::authz::{assign_tenant, authorize_record_access, Principal};
use crate::database::models::{HelpRecord, Voter};
use crate::database::scoped::TenantRow;
use crate::error::ApiError;
use crate::services::audit_service::{self, NewAuditEntry};
use crate::types::{AuditAction, EntityKind};

#[derive(Debug, Deserialize)]
pub struct CreateHelpRecord {
    pub voter_id: Uuid,
    pub leader_id: Option<Uuid>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub responsible_id: Option<Uuid>,
    pub documents: Option<Vec<String>>,
    pub notes: Option<String>,
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateHelpRecord {
    pub leader_id: Option<Uuid>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub responsible_id: Option<Uuid>,
    pub documents: Option<Vec<String>>,
    pub notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Help record joined with the names clients render in lists.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HelpRecordView {
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
    pub voter_name: String,
    pub leader_name: String,
    pub responsible_name: String,
}

const VIEW_SELECT: &str = "SELECT h.id, h.voter_id, h.leader_id, h.category, h.description, \
     h.status, h.responsible_id, h.documents, h.notes, h.completed_at, h.tenant_id, \
     h.created_at, h.updated_at, \
     COALESCE(vt.name, '') AS voter_name, \
     COALESCE(l.name, '') AS leader_name, \
     COALESCE(r.name, '') AS responsible_name \
     FROM help_records h \
     LEFT JOIN voters vt ON vt.id = h.voter_id \
     LEFT JOIN leaders l ON l.id = h.leader_id \
     LEFT JOIN accounts r ON r.id = h.responsible_id";

pub async fn create(
    pool: &PgPool,
    principal: &Principal,
    payload: CreateHelpRecord,
) -> Result<HelpRecordView, ApiError> {
    let tenant_id = assign_tenant(principal, payload.tenant_id)?;

    let category = payload.category.as_deref().unwrap_or("other");
    validate_category(category)?;
    let status = payload.status.as_deref().unwrap_or("pending");
    validate_status(status)?;

    let voter = fetch_voter_in_tenant(pool, payload.voter_id, tenant_id).await?;

    let id = Uuid::new_v4();
    let sql = format!(
        "INSERT INTO help_records \
         (id, voter_id, leader_id, category, description, status, responsible_id, documents, notes, completed_at, tenant_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NULL, $10) \
         RETURNING {}",
        HelpRecord::COLUMNS
    );
    let record = sqlx::query_as::<_, HelpRecord>(&sql)
        .bind(id)
        .bind(voter.id)
        .bind(payload.leader_id)
        .bind(category)
        .bind(&payload.description)
        .bind(status)
        .bind(payload.responsible_id)
        .bind(&payload.documents)
        .bind(&payload.notes)
        .bind(tenant_id)
        .fetch_one(pool)
        .await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Create,
            EntityKind::HelpRecord,
            format!("Help record opened for voter: {}", voter.name),
        )
        .entity(record.id)
        .tenant(record.tenant_id)
        .by(principal),
    )
    .await;

    get(pool, principal, record.id).await
}

pub async fn list(pool: &PgPool, principal: &Principal) -> Result<Vec<HelpRecordView>, ApiError> {
    let views = match principal.scope().filter() {
        None => {
            let sql = format!("{} ORDER BY h.created_at DESC", VIEW_SELECT);
            sqlx::query_as::<_, HelpRecordView>(&sql).fetch_all(pool).await?
        }
        Some(tenant_id) => {
            let sql = format!("{} WHERE h.tenant_id = $1 ORDER BY h.created_at DESC", VIEW_SELECT);
            sqlx::query_as::<_, HelpRecordView>(&sql).bind(tenant_id).fetch_all(pool).await?
        }
    };
    Ok(views)
}

pub async fn get(
    pool: &PgPool,
    principal: &Principal,
    id: Uuid,
) -> Result<HelpRecordView, ApiError> {
    let sql = format!("{} WHERE h.id = $1", VIEW_SELECT);
    let view = sqlx::query_as::<_, HelpRecordView>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Help record not found"))?;
    authorize_record_access(principal, view.tenant_id)?;
    Ok(view)
}

pub async fn update(
    pool: &PgPool,
    principal: &Principal,
    id: Uuid,
    payload: UpdateHelpRecord,
) -> Result<HelpRecordView, ApiError> {
    let current = get(pool, principal, id).await?;

    if let Some(category) = payload.category.as_deref() {
        validate_category(category)?;
    }
    if let Some(status) = payload.status.as_deref() {
        validate_status(status)?;
    }

    // Completion is stamped when the status lands on completed, unless the
    // client supplied an explicit timestamp
    let completed_at = match (payload.status.as_deref(), payload.completed_at) {
        (_, Some(explicit)) => Some(explicit),
        (Some("completed"), None) if current.status != "completed" => Some(Utc::now()),
        _ => None,
    };

    sqlx::query(
        "UPDATE help_records SET \
         leader_id = COALESCE($2, leader_id), \
         category = COALESCE($3, category), \
         description = COALESCE($4, description), \
         status = COALESCE($5, status), \
         responsible_id = COALESCE($6, responsible_id), \
         documents = COALESCE($7, documents), \
         notes = COALESCE($8, notes), \
         completed_at = COALESCE($9, completed_at), \
         updated_at = now() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(payload.leader_id)
    .bind(&payload.category)
    .bind(&payload.description)
    .bind(&payload.status)
    .bind(payload.responsible_id)
    .bind(&payload.documents)
    .bind(&payload.notes)
    .bind(completed_at)
    .execute(pool)
    .await?;

    let view = get(pool, principal, id).await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Update,
            EntityKind::HelpRecord,
            format!("Help record updated for voter: {}", view.voter_name),
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

    sqlx::query("DELETE FROM help_records WHERE id = $1").bind(id).execute(pool).await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Delete,
            EntityKind::HelpRecord,
            format!("Help record deleted for voter: {}", view.voter_name),
        )
        .entity(view.id)
        .tenant(view.tenant_id)
        .by(principal),
    )
    .await;

    Ok(())
}

fn validate_category(category: &str) -> Result<(), ApiError> {
    if HelpRecord::CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "Invalid category '{}', expected one of: {}",
            category,
            HelpRecord::CATEGORIES.join(", ")
        )))
    }
}

fn validate_status(status: &str) -> Result<(), ApiError> {
    if HelpRecord::STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "Invalid status '{}', expected one of: {}",
            status,
            HelpRecord::STATUSES.join(", ")
        )))
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_validation_rejects_unknown_values() {
        assert!(validate_category("health").is_ok());
        assert!(validate_category("other").is_ok());
        let err = validate_category("plumbing").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn status_validation_rejects_unknown_values() {
        assert!(validate_status("pending").is_ok());
        assert!(validate_status("resolved").is_err());
    }
}
