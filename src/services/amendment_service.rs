use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::authz::{assign_tenant, Principal};
use crate::database::models::Amendment;
use crate::database::scoped::TenantRow;
use crate::database::ScopedRepository;
use crate::error::ApiError;
use crate::services::audit_service::{self, NewAuditEntry};
use crate::types::{AuditAction, EntityKind};

#[derive(Debug, Deserialize)]
pub struct CreateAmendment {
    pub code: String,
    pub value: Decimal,
    pub destination: String,
    pub objective: String,
    pub status: Option<String>,
    pub execution_percentage: Option<i32>,
    pub documents: Option<Vec<String>>,
    pub photos: Option<Vec<String>>,
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAmendment {
    pub code: Option<String>,
    pub value: Option<Decimal>,
    pub destination: Option<String>,
    pub objective: Option<String>,
    pub status: Option<String>,
    pub execution_percentage: Option<i32>,
    pub documents: Option<Vec<String>>,
    pub photos: Option<Vec<String>>,
}

fn repo(pool: &PgPool) -> ScopedRepository<Amendment> {
    ScopedRepository::new(pool.clone())
}

pub async fn create(
    pool: &PgPool,
    principal: &Principal,
    payload: CreateAmendment,
) -> Result<Amendment, ApiError> {
    if payload.code.trim().is_empty() {
        return Err(ApiError::bad_request("Amendment code is required"));
    }
    if payload.destination.trim().is_empty() {
        return Err(ApiError::bad_request("Amendment destination is required"));
    }
    let status = payload.status.as_deref().unwrap_or("approved");
    validate_status(status)?;
    let execution_percentage = payload.execution_percentage.unwrap_or(0);
    validate_percentage(execution_percentage)?;

    let tenant_id = assign_tenant(principal, payload.tenant_id)?;
    ensure_code_free(pool, payload.code.trim(), None).await?;

    let id = Uuid::new_v4();
    let sql = format!(
        "INSERT INTO amendments \
         (id, code, value, destination, objective, status, execution_percentage, documents, photos, tenant_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {}",
        Amendment::COLUMNS
    );
    let amendment = sqlx::query_as::<_, Amendment>(&sql)
        .bind(id)
        .bind(payload.code.trim())
        .bind(payload.value)
        .bind(payload.destination.trim())
        .bind(&payload.objective)
        .bind(status)
        .bind(execution_percentage)
        .bind(&payload.documents)
        .bind(&payload.photos)
        .bind(tenant_id)
        .fetch_one(pool)
        .await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Create,
            EntityKind::Amendment,
            format!("Amendment created: {}", amendment.code),
        )
        .entity(amendment.id)
        .tenant(amendment.tenant_id)
        .by(principal),
    )
    .await;

    Ok(amendment)
}

pub async fn list(pool: &PgPool, principal: &Principal) -> Result<Vec<Amendment>, ApiError> {
    let amendments = repo(pool).list(principal.scope()).await?;
    Ok(amendments)
}

pub async fn get(pool: &PgPool, principal: &Principal, id: Uuid) -> Result<Amendment, ApiError> {
    repo(pool).fetch_scoped(principal, id).await
}

pub async fn update(
    pool: &PgPool,
    principal: &Principal,
    id: Uuid,
    payload: UpdateAmendment,
) -> Result<Amendment, ApiError> {
    repo(pool).fetch_scoped(principal, id).await?;

    if let Some(status) = payload.status.as_deref() {
        validate_status(status)?;
    }
    if let Some(percentage) = payload.execution_percentage {
        validate_percentage(percentage)?;
    }
    if let Some(code) = payload.code.as_deref() {
        ensure_code_free(pool, code.trim(), Some(id)).await?;
    }

    let sql = format!(
        "UPDATE amendments SET \
         code = COALESCE($2, code), \
         value = COALESCE($3, value), \
         destination = COALESCE($4, destination), \
         objective = COALESCE($5, objective), \
         status = COALESCE($6, status), \
         execution_percentage = COALESCE($7, execution_percentage), \
         documents = COALESCE($8, documents), \
         photos = COALESCE($9, photos), \
         updated_at = now() \
         WHERE id = $1 \
         RETURNING {}",
        Amendment::COLUMNS
    );
    let amendment = sqlx::query_as::<_, Amendment>(&sql)
        .bind(id)
        .bind(&payload.code)
        .bind(payload.value)
        .bind(&payload.destination)
        .bind(&payload.objective)
        .bind(&payload.status)
        .bind(payload.execution_percentage)
        .bind(&payload.documents)
        .bind(&payload.photos)
        .fetch_one(pool)
        .await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Update,
            EntityKind::Amendment,
            format!("Amendment updated: {}", amendment.code),
        )
        .entity(amendment.id)
        .tenant(amendment.tenant_id)
        .by(principal),
    )
    .await;

    Ok(amendment)
}

pub async fn remove(pool: &PgPool, principal: &Principal, id: Uuid) -> Result<(), ApiError> {
    let amendment = repo(pool).delete_scoped(principal, id).await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Delete,
            EntityKind::Amendment,
            format!("Amendment deleted: {}", amendment.code),
        )
        .entity(amendment.id)
        .tenant(amendment.tenant_id)
        .by(principal),
    )
    .await;

    Ok(())
}

fn validate_status(status: &str) -> Result<(), ApiError> {
    if Amendment::STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "Invalid amendment status '{}', expected one of: {}",
            status,
            Amendment::STATUSES.join(", ")
        )))
    }
}

fn validate_percentage(percentage: i32) -> Result<(), ApiError> {
    if (0..=100).contains(&percentage) {
        Ok(())
    } else {
        Err(ApiError::bad_request("Execution percentage must be between 0 and 100"))
    }
}

async fn ensure_code_free(pool: &PgPool, code: &str, exclude: Option<Uuid>) -> Result<(), ApiError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM amendments WHERE code = $1 AND ($2::uuid IS NULL OR id <> $2)",
    )
    .bind(code)
    .bind(exclude)
    .fetch_one(pool)
    .await?;
    if count > 0 {
        return Err(ApiError::conflict("An amendment with this code already exists"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_bounds() {
        assert!(validate_percentage(0).is_ok());
        assert!(validate_percentage(100).is_ok());
        assert!(validate_percentage(-1).is_err());
        assert!(validate_percentage(101).is_err());
    }

    #[test]
    fn status_validation() {
        assert!(validate_status("in_execution").is_ok());
        assert!(validate_status("paused").is_err());
    }
}
