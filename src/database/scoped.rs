use sqlx::{self, postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use crate::authz::{authorize_record_access, Principal, TenantScope};
use crate::database::manager::DatabaseError;
use crate::error::ApiError;
use crate::types::EntityKind;

/// Rows that carry tenant ownership. Every tenant-scoped table implements
/// this so the repository can apply the same visibility rules everywhere.
pub trait TenantRow {
    const KIND: EntityKind;
    /// Explicit column list for SELECTs, kept in sync with the table DDL.
    const COLUMNS: &'static str;

    fn id(&self) -> Uuid;
    fn tenant_id(&self) -> Option<Uuid>;
}

/// Uniform scoped access to one tenant-owned table.
///
/// Inserts and updates stay in the per-entity services since their column
/// sets differ; reads, deletes and orphan bookkeeping are identical across
/// tables and live here.
pub struct ScopedRepository<T> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> ScopedRepository<T>
where
    T: TenantRow + for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(pool: PgPool) -> Self {
        Self { pool, _phantom: std::marker::PhantomData }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// List rows visible in `scope`. Unrestricted scope gets no tenant
    /// filter at all; tenant scope sees exactly its own rows, orphans
    /// excluded.
    pub async fn list(&self, scope: TenantScope) -> Result<Vec<T>, DatabaseError> {
        let rows = match scope.filter() {
            None => {
                let sql = format!(
                    "SELECT {} FROM {} ORDER BY created_at DESC",
                    T::COLUMNS,
                    T::KIND.table()
                );
                sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?
            }
            Some(tenant_id) => {
                let sql = format!(
                    "SELECT {} FROM {} WHERE tenant_id = $1 ORDER BY created_at DESC",
                    T::COLUMNS,
                    T::KIND.table()
                );
                sqlx::query_as::<_, T>(&sql).bind(tenant_id).fetch_all(&self.pool).await?
            }
        };
        Ok(rows)
    }

    /// Fetch by id with no scope applied. Callers that hand rows to clients
    /// must go through `fetch_scoped` instead.
    pub async fn fetch(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", T::COLUMNS, T::KIND.table());
        let row = sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row)
    }

    /// Fetch one row the principal is allowed to see. A missing id reports
    /// not-found before any scope decision, so probing ids leaks existence
    /// at most, never content.
    pub async fn fetch_scoped(&self, principal: &Principal, id: Uuid) -> Result<T, ApiError> {
        let row = self
            .fetch(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("{} not found", T::KIND)))?;
        authorize_record_access(principal, row.tenant_id())?;
        Ok(row)
    }

    /// Delete one row after the same scope check as `fetch_scoped`. Returns
    /// the deleted row so callers can describe it in the audit trail.
    pub async fn delete_scoped(&self, principal: &Principal, id: Uuid) -> Result<T, ApiError> {
        let row = self.fetch_scoped(principal, id).await?;
        let sql = format!("DELETE FROM {} WHERE id = $1", T::KIND.table());
        sqlx::query(&sql).bind(id).execute(&self.pool).await.map_err(DatabaseError::Sqlx)?;
        Ok(row)
    }

    pub async fn count_orphans(&self) -> Result<i64, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE tenant_id IS NULL", T::KIND.table());
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Bulk-assign every orphan row to `target`. Idempotent: a second run
    /// finds no nulls left and reports zero.
    pub async fn claim_orphans(&self, target: Uuid) -> Result<u64, DatabaseError> {
        let sql = format!("UPDATE {} SET tenant_id = $1 WHERE tenant_id IS NULL", T::KIND.table());
        let result = sqlx::query(&sql).bind(target).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
