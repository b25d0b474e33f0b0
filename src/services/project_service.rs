use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::authz::{assign_tenant, Principal};
use crate::database::models::LawProject;
use crate::database::scoped::TenantRow;
use crate::database::ScopedRepository;
use crate::error::ApiError;
use crate::services::audit_service::{self, NewAuditEntry};
use crate::types::{AuditAction, EntityKind};

#[derive(Debug, Deserialize)]
pub struct CreateLawProject {
    pub number: String,
    pub title: String,
    pub summary: String,
    pub full_text: Option<String>,
    pub protocol_date: NaiveDate,
    pub status: Option<String>,
    pub timeline: Option<Value>,
    pub votes: Option<Value>,
    pub pdf_url: Option<String>,
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateLawProject {
    pub number: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub full_text: Option<String>,
    pub protocol_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub timeline: Option<Value>,
    pub votes: Option<Value>,
    pub pdf_url: Option<String>,
}

fn repo(pool: &PgPool) -> ScopedRepository<LawProject> {
    ScopedRepository::new(pool.clone())
}

pub async fn create(
    pool: &PgPool,
    principal: &Principal,
    payload: CreateLawProject,
) -> Result<LawProject, ApiError> {
    if payload.number.trim().is_empty() {
        return Err(ApiError::bad_request("Law project number is required"));
    }
    if payload.title.trim().is_empty() {
        return Err(ApiError::bad_request("Law project title is required"));
    }
    let status = payload.status.as_deref().unwrap_or("drafting");
    validate_status(status)?;

    let tenant_id = assign_tenant(principal, payload.tenant_id)?;
    ensure_number_free(pool, payload.number.trim(), None).await?;

    let id = Uuid::new_v4();
    let sql = format!(
        "INSERT INTO law_projects \
         (id, number, title, summary, full_text, protocol_date, status, timeline, votes, pdf_url, views, tenant_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0, $11) \
         RETURNING {}",
        LawProject::COLUMNS
    );
    let project = sqlx::query_as::<_, LawProject>(&sql)
        .bind(id)
        .bind(payload.number.trim())
        .bind(payload.title.trim())
        .bind(&payload.summary)
        .bind(&payload.full_text)
        .bind(payload.protocol_date)
        .bind(status)
        .bind(payload.timeline.unwrap_or_else(|| Value::Array(Vec::new())))
        .bind(&payload.votes)
        .bind(&payload.pdf_url)
        .bind(tenant_id)
        .fetch_one(pool)
        .await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Create,
            EntityKind::LawProject,
            format!("Law project created: {} ({})", project.title, project.number),
        )
        .entity(project.id)
        .tenant(project.tenant_id)
        .by(principal),
    )
    .await;

    Ok(project)
}

pub async fn list(pool: &PgPool, principal: &Principal) -> Result<Vec<LawProject>, ApiError> {
    let projects = repo(pool).list(principal.scope()).await?;
    Ok(projects)
}

pub async fn get(pool: &PgPool, principal: &Principal, id: Uuid) -> Result<LawProject, ApiError> {
    repo(pool).fetch_scoped(principal, id).await
}

pub async fn update(
    pool: &PgPool,
    principal: &Principal,
    id: Uuid,
    payload: UpdateLawProject,
) -> Result<LawProject, ApiError> {
    repo(pool).fetch_scoped(principal, id).await?;

    if let Some(status) = payload.status.as_deref() {
        validate_status(status)?;
    }
    if let Some(number) = payload.number.as_deref() {
        ensure_number_free(pool, number.trim(), Some(id)).await?;
    }

    let sql = format!(
        "UPDATE law_projects SET \
         number = COALESCE($2, number), \
         title = COALESCE($3, title), \
         summary = COALESCE($4, summary), \
         full_text = COALESCE($5, full_text), \
         protocol_date = COALESCE($6, protocol_date), \
         status = COALESCE($7, status), \
         timeline = COALESCE($8, timeline), \
         votes = COALESCE($9, votes), \
         pdf_url = COALESCE($10, pdf_url), \
         updated_at = now() \
         WHERE id = $1 \
         RETURNING {}",
        LawProject::COLUMNS
    );
    let project = sqlx::query_as::<_, LawProject>(&sql)
        .bind(id)
        .bind(&payload.number)
        .bind(&payload.title)
        .bind(&payload.summary)
        .bind(&payload.full_text)
        .bind(payload.protocol_date)
        .bind(&payload.status)
        .bind(&payload.timeline)
        .bind(&payload.votes)
        .bind(&payload.pdf_url)
        .fetch_one(pool)
        .await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Update,
            EntityKind::LawProject,
            format!("Law project updated: {} ({})", project.title, project.number),
        )
        .entity(project.id)
        .tenant(project.tenant_id)
        .by(principal),
    )
    .await;

    Ok(project)
}

pub async fn remove(pool: &PgPool, principal: &Principal, id: Uuid) -> Result<(), ApiError> {
    let project = repo(pool).delete_scoped(principal, id).await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Delete,
            EntityKind::LawProject,
            format!("Law project deleted: {} ({})", project.title, project.number),
        )
        .entity(project.id)
        .tenant(project.tenant_id)
        .by(principal),
    )
    .await;

    Ok(())
}

/// Bump the public view counter. Scope rules still apply, viewing is not
/// audited.
pub async fn increment_views(
    pool: &PgPool,
    principal: &Principal,
    id: Uuid,
) -> Result<LawProject, ApiError> {
    repo(pool).fetch_scoped(principal, id).await?;

    let sql = format!(
        "UPDATE law_projects SET views = views + 1, updated_at = now() WHERE id = $1 RETURNING {}",
        LawProject::COLUMNS
    );
    let project = sqlx::query_as::<_, LawProject>(&sql).bind(id).fetch_one(pool).await?;
    Ok(project)
}

fn validate_status(status: &str) -> Result<(), ApiError> {
    if LawProject::STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "Invalid law project status '{}', expected one of: {}",
            status,
            LawProject::STATUSES.join(", ")
        )))
    }
}

async fn ensure_number_free(
    pool: &PgPool,
    number: &str,
    exclude: Option<Uuid>,
) -> Result<(), ApiError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM law_projects WHERE number = $1 AND ($2::uuid IS NULL OR id <> $2)",
    )
    .bind(number)
    .bind(exclude)
    .fetch_one(pool)
    .await?;
    if count > 0 {
        return Err(ApiError::conflict("A law project with this number already exists"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_validation_covers_lifecycle() {
        for status in LawProject::STATUSES {
            assert!(validate_status(status).is_ok());
        }
        assert!(validate_status("tabled").is_err());
    }
}
