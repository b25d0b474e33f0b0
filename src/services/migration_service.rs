use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::authz::{Principal, Role};
use crate::database::models::{
    Account, Amendment, Appointment, HelpRecord, LawProject, Leader, Visit, Voter,
};
use crate::database::manager::DatabaseError;
use crate::database::scoped::TenantRow;
use crate::database::ScopedRepository;
use crate::error::ApiError;
use crate::services::audit_service::{self, NewAuditEntry};
use crate::types::{AuditAction, EntityKind};

/// Rows still carrying a null tenant, by entity kind.
#[derive(Debug, Clone, Serialize)]
pub struct OrphanCounts {
    pub accounts: i64,
    pub leaders: i64,
    pub voters: i64,
    pub visits: i64,
    pub help_records: i64,
    pub appointments: i64,
    pub law_projects: i64,
    pub amendments: i64,
}

impl OrphanCounts {
    pub fn total(&self) -> i64 {
        self.accounts
            + self.leaders
            + self.voters
            + self.visits
            + self.help_records
            + self.appointments
            + self.law_projects
            + self.amendments
    }
}

/// What a bulk orphan migration actually moved.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationOutcome {
    pub target_tenant_id: Uuid,
    pub target_self_assigned: bool,
    pub accounts: u64,
    pub leaders: u64,
    pub voters: u64,
    pub visits: u64,
    pub help_records: u64,
    pub appointments: u64,
    pub law_projects: u64,
    pub amendments: u64,
}

pub async fn orphan_counts(pool: &PgPool) -> Result<OrphanCounts, ApiError> {
    let accounts: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM accounts WHERE tenant_id IS NULL AND role IN ('aide', 'community-leader')",
    )
    .fetch_one(pool)
    .await?;

    let counts = OrphanCounts {
        accounts,
        leaders: count_orphans::<Leader>(pool).await?,
        voters: count_orphans::<Voter>(pool).await?,
        visits: count_orphans::<Visit>(pool).await?,
        help_records: count_orphans::<HelpRecord>(pool).await?,
        appointments: count_orphans::<Appointment>(pool).await?,
        law_projects: count_orphans::<LawProject>(pool).await?,
        amendments: count_orphans::<Amendment>(pool).await?,
    };
    Ok(counts)
}

/// Claim every orphan row for `target_tenant_id`. Each per-kind update is
/// its own statement, so a failure partway leaves earlier kinds migrated;
/// re-running finishes the rest. Running against a fully-migrated database
/// reports all zeroes.
pub async fn migrate_orphans(
    pool: &PgPool,
    principal: &Principal,
    target_tenant_id: Uuid,
) -> Result<MigrationOutcome, ApiError> {
    let target = fetch_account(pool, target_tenant_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Target office-holder account not found"))?;
    if target.role != Role::OfficeHolder.as_str() {
        return Err(ApiError::bad_request("Migration target must be an office-holder account"));
    }

    // Close the office-holder's own binding first when it is still open
    let self_assigned = sqlx::query(
        "UPDATE accounts SET tenant_id = id, updated_at = now() WHERE id = $1 AND tenant_id IS NULL",
    )
    .bind(target_tenant_id)
    .execute(pool)
    .await?
    .rows_affected()
        > 0;

    let accounts = sqlx::query(
        "UPDATE accounts SET tenant_id = $1, updated_at = now() \
         WHERE tenant_id IS NULL AND role IN ('aide', 'community-leader')",
    )
    .bind(target_tenant_id)
    .execute(pool)
    .await?
    .rows_affected();

    let outcome = MigrationOutcome {
        target_tenant_id,
        target_self_assigned: self_assigned,
        accounts,
        leaders: claim_orphans::<Leader>(pool, target_tenant_id).await?,
        voters: claim_orphans::<Voter>(pool, target_tenant_id).await?,
        visits: claim_orphans::<Visit>(pool, target_tenant_id).await?,
        help_records: claim_orphans::<HelpRecord>(pool, target_tenant_id).await?,
        appointments: claim_orphans::<Appointment>(pool, target_tenant_id).await?,
        law_projects: claim_orphans::<LawProject>(pool, target_tenant_id).await?,
        amendments: claim_orphans::<Amendment>(pool, target_tenant_id).await?,
    };

    tracing::info!(
        target = %target_tenant_id,
        accounts = outcome.accounts,
        leaders = outcome.leaders,
        voters = outcome.voters,
        visits = outcome.visits,
        help_records = outcome.help_records,
        appointments = outcome.appointments,
        law_projects = outcome.law_projects,
        amendments = outcome.amendments,
        "Orphan migration finished"
    );

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Migrate,
            EntityKind::Account,
            format!("Orphan records migrated to tenant: {}", target.name),
        )
        .entity(target_tenant_id)
        .tenant(Some(target_tenant_id))
        .details(json!({
            "accounts": outcome.accounts,
            "leaders": outcome.leaders,
            "voters": outcome.voters,
            "visits": outcome.visits,
            "help_records": outcome.help_records,
            "appointments": outcome.appointments,
            "law_projects": outcome.law_projects,
            "amendments": outcome.amendments,
        }))
        .by(principal),
    )
    .await;

    Ok(outcome)
}

/// Rebind one account's tenant. Office-holders always bind to themselves,
/// aides and community leaders bind to the given office-holder, admins stay
/// tenant-less.
pub async fn bind_account(
    pool: &PgPool,
    principal: &Principal,
    account_id: Uuid,
    requested: Option<Uuid>,
) -> Result<Account, ApiError> {
    let account = fetch_account(pool, account_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Account not found"))?;

    let role = Role::from_str(&account.role).map_err(|_| {
        tracing::error!(account_id = %account.id, role = %account.role, "Stored role is not recognized");
        ApiError::internal_server_error("Account has an invalid role")
    })?;

    let tenant_id = match role {
        Role::Admin => {
            return Err(ApiError::bad_request("Admin accounts are tenant-less and cannot be bound"))
        }
        Role::OfficeHolder => {
            if matches!(requested, Some(requested) if requested != account.id) {
                return Err(ApiError::bad_request(
                    "Office-holder accounts are always bound to themselves",
                ));
            }
            account.id
        }
        Role::Aide | Role::CommunityLeader => {
            let tenant_id = requested
                .ok_or_else(|| ApiError::bad_request("A target tenant id is required"))?;
            let tenant = fetch_account(pool, tenant_id)
                .await?
                .ok_or_else(|| ApiError::bad_request("Tenant id does not reference any account"))?;
            if tenant.role != Role::OfficeHolder.as_str() {
                return Err(ApiError::bad_request(
                    "Tenant id must reference an office-holder account",
                ));
            }
            tenant_id
        }
    };

    let sql = format!(
        "UPDATE accounts SET tenant_id = $2, updated_at = now() WHERE id = $1 RETURNING {}",
        Account::COLUMNS
    );
    let bound = sqlx::query_as::<_, Account>(&sql)
        .bind(account_id)
        .bind(tenant_id)
        .fetch_one(pool)
        .await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Update,
            EntityKind::Account,
            format!("Account bound to tenant: {}", bound.name),
        )
        .entity(bound.id)
        .tenant(bound.tenant_id)
        .by(principal),
    )
    .await;

    Ok(bound)
}

async fn count_orphans<T>(pool: &PgPool) -> Result<i64, DatabaseError>
where
    T: TenantRow + for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    ScopedRepository::<T>::new(pool.clone()).count_orphans().await
}

async fn claim_orphans<T>(pool: &PgPool, target: Uuid) -> Result<u64, DatabaseError>
where
    T: TenantRow + for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    ScopedRepository::<T>::new(pool.clone()).claim_orphans(target).await
}

async fn fetch_account(pool: &PgPool, id: Uuid) -> Result<Option<Account>, ApiError> {
    let sql = format!("SELECT {} FROM accounts WHERE id = $1", Account::COLUMNS);
    let account = sqlx::query_as::<_, Account>(&sql).bind(id).fetch_optional(pool).await?;
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orphan_totals_sum_every_kind() {
        let counts = OrphanCounts {
            accounts: 1,
            leaders: 2,
            voters: 3,
            visits: 4,
            help_records: 5,
            appointments: 6,
            law_projects: 7,
            amendments: 8,
        };
        assert_eq!(counts.total(), 36);
    }
}
