use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::authz::{Principal, TenantScope};
use crate::config;
use crate::database::manager::DatabaseError;
use crate::database::models::audit_entry::{AuditEntry, AUDIT_COLUMNS};
use crate::types::{AuditAction, EntityKind};

/// One audit event about to be recorded.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub action: AuditAction,
    pub entity_kind: EntityKind,
    pub entity_id: Option<Uuid>,
    pub description: String,
    pub actor_id: Option<Uuid>,
    pub actor_name: Option<String>,
    pub tenant_id: Option<Uuid>,
    pub details: Option<Value>,
}

impl NewAuditEntry {
    pub fn new(action: AuditAction, entity_kind: EntityKind, description: impl Into<String>) -> Self {
        Self {
            action,
            entity_kind,
            entity_id: None,
            description: description.into(),
            actor_id: None,
            actor_name: None,
            tenant_id: None,
            details: None,
        }
    }

    /// Stamp the acting principal. The tenant recorded here is the affected
    /// record's owner, set via [`NewAuditEntry::tenant`]; for non-admin
    /// actors both usually coincide.
    pub fn by(mut self, principal: &Principal) -> Self {
        self.actor_id = Some(principal.account_id);
        self.actor_name = Some(principal.name.clone());
        if self.tenant_id.is_none() {
            self.tenant_id = principal.effective_tenant_id;
        }
        self
    }

    pub fn entity(mut self, id: Uuid) -> Self {
        self.entity_id = Some(id);
        self
    }

    pub fn tenant(mut self, tenant_id: Option<Uuid>) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    pub fn details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Append-only audit sink. Implementations must never influence the outcome
/// of the operation being audited.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: NewAuditEntry);
}

/// Postgres-backed sink. Failures are logged and swallowed: a broken audit
/// trail must not fail the business mutation it describes.
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, entry: &NewAuditEntry) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO audit_logs \
             (id, action, entity_kind, entity_id, description, actor_id, actor_name, details, tenant_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(Uuid::new_v4())
        .bind(entry.action.as_str())
        .bind(entry.entity_kind.as_str())
        .bind(entry.entity_id)
        .bind(&entry.description)
        .bind(entry.actor_id)
        .bind(&entry.actor_name)
        .bind(&entry.details)
        .bind(entry.tenant_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn record(&self, entry: NewAuditEntry) {
        if let Err(e) = self.insert(&entry).await {
            error!(
                "Audit write failed for {} {} ({}): {}",
                entry.action, entry.entity_kind, entry.description, e
            );
        }
    }
}

/// Record one audit event. Never fails the caller.
pub async fn record(pool: &PgPool, entry: NewAuditEntry) {
    PgAuditSink::new(pool.clone()).record(entry).await
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    let audit = &config::config().audit;
    limit.unwrap_or(audit.list_limit).clamp(1, audit.max_list_limit)
}

/// Recent audit entries visible in `scope`, newest first.
pub async fn list(
    pool: &PgPool,
    scope: TenantScope,
    limit: Option<i64>,
) -> Result<Vec<AuditEntry>, DatabaseError> {
    let limit = clamp_limit(limit);
    let entries = match scope.filter() {
        None => {
            let sql = format!(
                "SELECT {} FROM audit_logs ORDER BY timestamp DESC LIMIT $1",
                AUDIT_COLUMNS
            );
            sqlx::query_as::<_, AuditEntry>(&sql).bind(limit).fetch_all(pool).await?
        }
        Some(tenant_id) => {
            let sql = format!(
                "SELECT {} FROM audit_logs WHERE tenant_id = $1 ORDER BY timestamp DESC LIMIT $2",
                AUDIT_COLUMNS
            );
            sqlx::query_as::<_, AuditEntry>(&sql)
                .bind(tenant_id)
                .bind(limit)
                .fetch_all(pool)
                .await?
        }
    };
    Ok(entries)
}

pub async fn list_by_entity(
    pool: &PgPool,
    scope: TenantScope,
    entity_kind: EntityKind,
) -> Result<Vec<AuditEntry>, DatabaseError> {
    let limit = clamp_limit(None);
    let entries = match scope.filter() {
        None => {
            let sql = format!(
                "SELECT {} FROM audit_logs WHERE entity_kind = $1 ORDER BY timestamp DESC LIMIT $2",
                AUDIT_COLUMNS
            );
            sqlx::query_as::<_, AuditEntry>(&sql)
                .bind(entity_kind.as_str())
                .bind(limit)
                .fetch_all(pool)
                .await?
        }
        Some(tenant_id) => {
            let sql = format!(
                "SELECT {} FROM audit_logs WHERE entity_kind = $1 AND tenant_id = $2 \
                 ORDER BY timestamp DESC LIMIT $3",
                AUDIT_COLUMNS
            );
            sqlx::query_as::<_, AuditEntry>(&sql)
                .bind(entity_kind.as_str())
                .bind(tenant_id)
                .bind(limit)
                .fetch_all(pool)
                .await?
        }
    };
    Ok(entries)
}

pub async fn list_by_action(
    pool: &PgPool,
    scope: TenantScope,
    action: AuditAction,
) -> Result<Vec<AuditEntry>, DatabaseError> {
    let limit = clamp_limit(None);
    let entries = match scope.filter() {
        None => {
            let sql = format!(
                "SELECT {} FROM audit_logs WHERE action = $1 ORDER BY timestamp DESC LIMIT $2",
                AUDIT_COLUMNS
            );
            sqlx::query_as::<_, AuditEntry>(&sql)
                .bind(action.as_str())
                .bind(limit)
                .fetch_all(pool)
                .await?
        }
        Some(tenant_id) => {
            let sql = format!(
                "SELECT {} FROM audit_logs WHERE action = $1 AND tenant_id = $2 \
                 ORDER BY timestamp DESC LIMIT $3",
                AUDIT_COLUMNS
            );
            sqlx::query_as::<_, AuditEntry>(&sql)
                .bind(action.as_str())
                .bind(tenant_id)
                .bind(limit)
                .fetch_all(pool)
                .await?
        }
    };
    Ok(entries)
}

/// Drop every audit entry visible in `scope`. Returns how many were
/// removed.
pub async fn clear(pool: &PgPool, scope: TenantScope) -> Result<u64, DatabaseError> {
    let removed = match scope.filter() {
        None => sqlx::query("DELETE FROM audit_logs").execute(pool).await?.rows_affected(),
        Some(tenant_id) => {
            sqlx::query("DELETE FROM audit_logs WHERE tenant_id = $1")
                .bind(tenant_id)
                .execute(pool)
                .await?
                .rows_affected()
        }
    };
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MemorySink {
        entries: Mutex<Vec<NewAuditEntry>>,
    }

    #[async_trait]
    impl AuditSink for MemorySink {
        async fn record(&self, entry: NewAuditEntry) {
            self.entries.lock().unwrap().push(entry);
        }
    }

    #[tokio::test]
    async fn sink_contract_is_infallible() {
        let sink = MemorySink { entries: Mutex::new(vec![]) };
        let tenant = Uuid::new_v4();
        let entry = NewAuditEntry::new(AuditAction::Create, EntityKind::Voter, "Voter registered")
            .entity(Uuid::new_v4())
            .tenant(Some(tenant));
        sink.record(entry).await;

        let recorded = sink.entries.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].tenant_id, Some(tenant));
    }

    #[test]
    fn actor_stamp_does_not_override_explicit_tenant() {
        let record_owner = Uuid::new_v4();
        let admin = crate::authz::principal::fixtures::admin();
        let entry = NewAuditEntry::new(AuditAction::Delete, EntityKind::Visit, "Visit removed")
            .tenant(Some(record_owner))
            .by(&admin);
        assert_eq!(entry.tenant_id, Some(record_owner));
        assert_eq!(entry.actor_id, Some(admin.account_id));
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(clamp_limit(None), config::config().audit.list_limit);
        assert_eq!(clamp_limit(Some(0)), 1);
        let max = config::config().audit.max_list_limit;
        assert_eq!(clamp_limit(Some(max + 50)), max);
    }
}
