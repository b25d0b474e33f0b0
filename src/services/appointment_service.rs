use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::authz::{assign_tenant, authorize_record_access, Principal};
use crate::database::models::Appointment;
use crate::database::scoped::TenantRow;
use crate::error::ApiError;
use crate::services::audit_service::{self, NewAuditEntry};
use crate::types::{AuditAction, EntityKind};

#[derive(Debug, Deserialize)]
pub struct CreateAppointment {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
    pub voter_id: Option<Uuid>,
    pub leader_id: Option<Uuid>,
    pub responsible_id: Option<Uuid>,
    pub notes: Option<String>,
    pub reminders: Option<Value>,
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAppointment {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
    pub voter_id: Option<Uuid>,
    pub leader_id: Option<Uuid>,
    pub responsible_id: Option<Uuid>,
    pub notes: Option<String>,
    pub reminders: Option<Value>,
    pub completed: Option<bool>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Appointment joined with the names clients render in the agenda.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AppointmentView {
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
    pub reminders: Value,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub tenant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub voter_name: String,
    pub leader_name: String,
    pub responsible_name: String,
}

const VIEW_SELECT: &str = "SELECT a.id, a.title, a.description, a.kind, a.status, a.date, a.time, \
     a.duration_minutes, a.location, a.voter_id, a.leader_id, a.responsible_id, a.notes, \
     a.reminders, a.completed, a.completed_at, a.tenant_id, a.created_at, a.updated_at, \
     COALESCE(vt.name, '') AS voter_name, \
     COALESCE(l.name, '') AS leader_name, \
     COALESCE(r.name, '') AS responsible_name \
     FROM appointments a \
     LEFT JOIN voters vt ON vt.id = a.voter_id \
     LEFT JOIN leaders l ON l.id = a.leader_id \
     LEFT JOIN accounts r ON r.id = a.responsible_id";

pub async fn create(
    pool: &PgPool,
    principal: &Principal,
    payload: CreateAppointment,
) -> Result<AppointmentView, ApiError> {
    let title = required_text(payload.title.as_deref(), "Appointment title is required")?;
    let kind = required_text(payload.kind.as_deref(), "Appointment kind is required")?;
    let date = payload.date.ok_or_else(|| ApiError::bad_request("Appointment date is required"))?;
    let time = required_text(payload.time.as_deref(), "Appointment time is required")?;
    let responsible_id = payload
        .responsible_id
        .ok_or_else(|| ApiError::bad_request("Responsible account id is required"))?;

    validate_kind(kind)?;
    let status = payload.status.as_deref().unwrap_or("scheduled");
    validate_status(status)?;

    let tenant_id = assign_tenant(principal, payload.tenant_id)?;

    ensure_responsible_exists(pool, responsible_id).await?;
    if let Some(voter_id) = payload.voter_id {
        ensure_voter_in_tenant(pool, voter_id, tenant_id).await?;
    }
    if let Some(leader_id) = payload.leader_id {
        ensure_leader_in_tenant(pool, leader_id, tenant_id).await?;
    }

    let id = Uuid::new_v4();
    let sql = format!(
        "INSERT INTO appointments \
         (id, title, description, kind, status, date, time, duration_minutes, location, \
          voter_id, leader_id, responsible_id, notes, reminders, tenant_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
         RETURNING {}",
        Appointment::COLUMNS
    );
    let appointment = sqlx::query_as::<_, Appointment>(&sql)
        .bind(id)
        .bind(title)
        .bind(&payload.description)
        .bind(kind)
        .bind(status)
        .bind(date)
        .bind(time)
        .bind(payload.duration_minutes)
        .bind(&payload.location)
        .bind(payload.voter_id)
        .bind(payload.leader_id)
        .bind(responsible_id)
        .bind(&payload.notes)
        .bind(payload.reminders.unwrap_or_else(|| Value::Array(Vec::new())))
        .bind(tenant_id)
        .fetch_one(pool)
        .await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Create,
            EntityKind::Appointment,
            format!("Appointment created: {}", appointment.title),
        )
        .entity(appointment.id)
        .tenant(appointment.tenant_id)
        .by(principal),
    )
    .await;

    get(pool, principal, appointment.id).await
}

pub async fn list(pool: &PgPool, principal: &Principal) -> Result<Vec<AppointmentView>, ApiError> {
    let views = match principal.scope().filter() {
        None => {
            let sql = format!("{} ORDER BY a.date DESC, a.time ASC", VIEW_SELECT);
            sqlx::query_as::<_, AppointmentView>(&sql).fetch_all(pool).await?
        }
        Some(tenant_id) => {
            let sql =
                format!("{} WHERE a.tenant_id = $1 ORDER BY a.date DESC, a.time ASC", VIEW_SELECT);
            sqlx::query_as::<_, AppointmentView>(&sql).bind(tenant_id).fetch_all(pool).await?
        }
    };
    Ok(views)
}

pub async fn get(
    pool: &PgPool,
    principal: &Principal,
    id: Uuid,
) -> Result<AppointmentView, ApiError> {
    let sql = format!("{} WHERE a.id = $1", VIEW_SELECT);
    let view = sqlx::query_as::<_, AppointmentView>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Appointment not found"))?;
    authorize_record_access(principal, view.tenant_id)?;
    Ok(view)
}

pub async fn update(
    pool: &PgPool,
    principal: &Principal,
    id: Uuid,
    payload: UpdateAppointment,
) -> Result<AppointmentView, ApiError> {
    let current = get(pool, principal, id).await?;

    if let Some(kind) = payload.kind.as_deref() {
        validate_kind(kind)?;
    }
    if let Some(status) = payload.status.as_deref() {
        validate_status(status)?;
    }
    if let (Some(voter_id), Some(tenant_id)) = (payload.voter_id, current.tenant_id) {
        ensure_voter_in_tenant(pool, voter_id, tenant_id).await?;
    }
    if let (Some(leader_id), Some(tenant_id)) = (payload.leader_id, current.tenant_id) {
        ensure_leader_in_tenant(pool, leader_id, tenant_id).await?;
    }
    if let Some(responsible_id) = payload.responsible_id {
        ensure_responsible_exists(pool, responsible_id).await?;
    }

    let completed_at = match (payload.completed, payload.completed_at) {
        (_, Some(explicit)) => Some(explicit),
        (Some(true), None) if !current.completed => Some(Utc::now()),
        _ => None,
    };

    sqlx::query(
        "UPDATE appointments SET \
         title = COALESCE($2, title), \
         description = COALESCE($3, description), \
         kind = COALESCE($4, kind), \
         status = COALESCE($5, status), \
         date = COALESCE($6, date), \
         time = COALESCE($7, time), \
         duration_minutes = COALESCE($8, duration_minutes), \
         location = COALESCE($9, location), \
         voter_id = COALESCE($10, voter_id), \
         leader_id = COALESCE($11, leader_id), \
         responsible_id = COALESCE($12, responsible_id), \
         notes = COALESCE($13, notes), \
         reminders = COALESCE($14, reminders), \
         completed = COALESCE($15, completed), \
         completed_at = COALESCE($16, completed_at), \
         updated_at = now() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.kind)
    .bind(&payload.status)
    .bind(payload.date)
    .bind(&payload.time)
    .bind(payload.duration_minutes)
    .bind(&payload.location)
    .bind(payload.voter_id)
    .bind(payload.leader_id)
    .bind(payload.responsible_id)
    .bind(&payload.notes)
    .bind(&payload.reminders)
    .bind(payload.completed)
    .bind(completed_at)
    .execute(pool)
    .await?;

    let view = get(pool, principal, id).await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Update,
            EntityKind::Appointment,
            format!("Appointment updated: {}", view.title),
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

    sqlx::query("DELETE FROM appointments WHERE id = $1").bind(id).execute(pool).await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Delete,
            EntityKind::Appointment,
            format!("Appointment deleted: {}", view.title),
        )
        .entity(view.id)
        .tenant(view.tenant_id)
        .by(principal),
    )
    .await;

    Ok(())
}

fn required_text<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, ApiError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ApiError::bad_request(message)),
    }
}

fn validate_kind(kind: &str) -> Result<(), ApiError> {
    if Appointment::KINDS.contains(&kind) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "Invalid appointment kind '{}', expected one of: {}",
            kind,
            Appointment::KINDS.join(", ")
        )))
    }
}

fn validate_status(status: &str) -> Result<(), ApiError> {
    if Appointment::STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "Invalid appointment status '{}', expected one of: {}",
            status,
            Appointment::STATUSES.join(", ")
        )))
    }
}

async fn ensure_responsible_exists(pool: &PgPool, responsible_id: Uuid) -> Result<(), ApiError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE id = $1")
        .bind(responsible_id)
        .fetch_one(pool)
        .await?;
    if count == 0 {
        return Err(ApiError::bad_request(
            "Responsible account not found, check the user and try again",
        ));
    }
    Ok(())
}

async fn ensure_voter_in_tenant(
    pool: &PgPool,
    voter_id: Uuid,
    tenant_id: Uuid,
) -> Result<(), ApiError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM voters WHERE id = $1 AND tenant_id = $2")
            .bind(voter_id)
            .bind(tenant_id)
            .fetch_one(pool)
            .await?;
    if count == 0 {
        return Err(ApiError::bad_request(
            "Voter not found, refresh the voter list and try again",
        ));
    }
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
        return Err(ApiError::bad_request(
            "Leader not found, refresh the leader list and try again",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_rejects_blank() {
        assert_eq!(required_text(Some("  meeting  "), "msg").unwrap(), "meeting");
        assert!(required_text(Some("   "), "msg").is_err());
        assert!(required_text(None, "msg").is_err());
    }

    #[test]
    fn kind_and_status_validation() {
        assert!(validate_kind("meeting").is_ok());
        assert!(validate_kind("party").is_err());
        assert!(validate_status("scheduled").is_ok());
        assert!(validate_status("done").is_err());
    }
}
