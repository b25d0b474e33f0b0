use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::authz::{assign_tenant, Principal};
use crate::database::models::{Account, Leader};
use crate::database::scoped::TenantRow;
use crate::database::ScopedRepository;
use crate::error::ApiError;
use crate::services::audit_service::{self, NewAuditEntry};
use crate::types::{AuditAction, EntityKind};

const DEFAULT_REGION: &str = "unassigned";
const DEFAULT_VOTERS_GOAL: i32 = 100;

#[derive(Debug, Deserialize)]
pub struct CreateLeader {
    pub name: String,
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub region: Option<String>,
    pub voters_count: Option<i32>,
    pub voters_goal: Option<i32>,
    pub active: Option<bool>,
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateLeader {
    pub name: Option<String>,
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub region: Option<String>,
    pub voters_count: Option<i32>,
    pub voters_goal: Option<i32>,
    pub active: Option<bool>,
}

/// Client-supplied hints for resolving which leader a record belongs to.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeaderReference {
    pub leader_id: Option<Uuid>,
    pub account_id: Option<Uuid>,
}

fn repo(pool: &PgPool) -> ScopedRepository<Leader> {
    ScopedRepository::new(pool.clone())
}

pub async fn create(
    pool: &PgPool,
    principal: &Principal,
    payload: CreateLeader,
) -> Result<Leader, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("Leader name is required"));
    }
    let tenant_id = assign_tenant(principal, payload.tenant_id)?;

    let id = Uuid::new_v4();
    let sql = format!(
        "INSERT INTO leaders \
         (id, name, national_id, phone, email, region, voters_count, voters_goal, active, account_id, tenant_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NULL, $10) \
         RETURNING {}",
        Leader::COLUMNS
    );
    let leader = sqlx::query_as::<_, Leader>(&sql)
        .bind(id)
        .bind(payload.name.trim())
        .bind(&payload.national_id)
        .bind(&payload.phone)
        .bind(&payload.email)
        .bind(payload.region.as_deref().unwrap_or(DEFAULT_REGION))
        .bind(payload.voters_count.unwrap_or(0))
        .bind(payload.voters_goal.unwrap_or(DEFAULT_VOTERS_GOAL))
        .bind(payload.active.unwrap_or(true))
        .bind(tenant_id)
        .fetch_one(pool)
        .await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Create,
            EntityKind::Leader,
            format!("Leader created: {}", leader.name),
        )
        .entity(leader.id)
        .tenant(leader.tenant_id)
        .by(principal),
    )
    .await;

    Ok(leader)
}

pub async fn list(pool: &PgPool, principal: &Principal) -> Result<Vec<Leader>, ApiError> {
    let leaders = repo(pool).list(principal.scope()).await?;
    Ok(leaders)
}

pub async fn get(pool: &PgPool, principal: &Principal, id: Uuid) -> Result<Leader, ApiError> {
    repo(pool).fetch_scoped(principal, id).await
}

pub async fn update(
    pool: &PgPool,
    principal: &Principal,
    id: Uuid,
    payload: UpdateLeader,
) -> Result<Leader, ApiError> {
    repo(pool).fetch_scoped(principal, id).await?;

    let sql = format!(
        "UPDATE leaders SET \
         name = COALESCE($2, name), \
         national_id = COALESCE($3, national_id), \
         phone = COALESCE($4, phone), \
         email = COALESCE($5, email), \
         region = COALESCE($6, region), \
         voters_count = COALESCE($7, voters_count), \
         voters_goal = COALESCE($8, voters_goal), \
         active = COALESCE($9, active), \
         updated_at = now() \
         WHERE id = $1 \
         RETURNING {}",
        Leader::COLUMNS
    );
    let leader = sqlx::query_as::<_, Leader>(&sql)
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.national_id)
        .bind(&payload.phone)
        .bind(&payload.email)
        .bind(&payload.region)
        .bind(payload.voters_count)
        .bind(payload.voters_goal)
        .bind(payload.active)
        .fetch_one(pool)
        .await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Update,
            EntityKind::Leader,
            format!("Leader updated: {}", leader.name),
        )
        .entity(leader.id)
        .tenant(leader.tenant_id)
        .by(principal),
    )
    .await;

    Ok(leader)
}

pub async fn remove(pool: &PgPool, principal: &Principal, id: Uuid) -> Result<(), ApiError> {
    let leader = repo(pool).delete_scoped(principal, id).await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Delete,
            EntityKind::Leader,
            format!("Leader deleted: {}", leader.name),
        )
        .entity(leader.id)
        .tenant(leader.tenant_id)
        .by(principal),
    )
    .await;

    Ok(())
}

/// Create the companion profile for a community-leader account, reusing an
/// existing one linked to the same account. Safe to call repeatedly.
pub async fn ensure_profile_for_account(
    pool: &PgPool,
    account: &Account,
) -> Result<Leader, ApiError> {
    if let Some(existing) = find_by_account(pool, account.id).await? {
        return Ok(existing);
    }

    let id = Uuid::new_v4();
    let sql = format!(
        "INSERT INTO leaders \
         (id, name, national_id, phone, email, region, voters_count, voters_goal, active, account_id, tenant_id) \
         VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $8, $9, $10) \
         RETURNING {}",
        Leader::COLUMNS
    );
    let leader = sqlx::query_as::<_, Leader>(&sql)
        .bind(id)
        .bind(&account.name)
        .bind(&account.national_id)
        .bind(&account.phone)
        .bind(&account.email)
        .bind(account.region.as_deref().unwrap_or(DEFAULT_REGION))
        .bind(DEFAULT_VOTERS_GOAL)
        .bind(account.active)
        .bind(account.id)
        .bind(account.tenant_id)
        .fetch_one(pool)
        .await?;

    tracing::info!(
        account_id = %account.id,
        leader_id = %leader.id,
        "Created companion leader profile"
    );
    Ok(leader)
}

/// Propagate account contact data to its companion profile. Creates the
/// profile when it is missing.
pub async fn sync_profile_for_account(pool: &PgPool, account: &Account) -> Result<(), ApiError> {
    if find_by_account(pool, account.id).await?.is_none() {
        ensure_profile_for_account(pool, account).await?;
        return Ok(());
    }

    sqlx::query(
        "UPDATE leaders SET \
         name = $2, \
         national_id = $3, \
         phone = $4, \
         email = $5, \
         region = COALESCE($6, region), \
         active = $7, \
         updated_at = now() \
         WHERE account_id = $1",
    )
    .bind(account.id)
    .bind(&account.name)
    .bind(&account.national_id)
    .bind(&account.phone)
    .bind(&account.email)
    .bind(&account.region)
    .bind(account.active)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_profile_for_account(pool: &PgPool, account_id: Uuid) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM leaders WHERE account_id = $1").bind(account_id).execute(pool).await?;
    Ok(())
}

/// Resolve the leader a new record should reference, walking a fixed chain
/// of lookups. Every step past the first is a data-quality signal and gets
/// logged as such; the chain never fails the caller, it only reports what
/// it could resolve.
///
/// Order: explicit leader id, profile linked to the acting account, contact
/// match against the account's email or national id, the voter's own
/// assigned leader, and finally a profile of convenience created from the
/// account. All lookups stay inside `tenant_id`.
pub async fn reconcile_reference(
    pool: &PgPool,
    tenant_id: Uuid,
    reference: LeaderReference,
    voter_leader_id: Option<Uuid>,
) -> Result<Option<Leader>, ApiError> {
    if let Some(leader_id) = reference.leader_id {
        if let Some(leader) = find_in_tenant(pool, leader_id, tenant_id).await? {
            return Ok(Some(leader));
        }
        tracing::warn!(
            %leader_id, %tenant_id,
            "Leader reference not found in tenant, continuing reconciliation"
        );
    }

    let account = match reference.account_id {
        Some(account_id) => fetch_account(pool, account_id).await?,
        None => None,
    };

    if let Some(account) = &account {
        if let Some(leader) = find_by_account(pool, account.id).await? {
            return Ok(Some(leader));
        }

        if let Some(leader) = find_by_contact(pool, tenant_id, account).await? {
            tracing::warn!(
                account_id = %account.id,
                leader_id = %leader.id,
                "Leader profile matched by contact data, linking to account"
            );
            let linked = link_account(pool, &leader, account.id).await?;
            return Ok(Some(linked));
        }
    } else if let Some(account_id) = reference.account_id {
        tracing::warn!(%account_id, "Account reference not found during leader reconciliation");
    }

    if let Some(leader_id) = voter_leader_id {
        if let Some(leader) = find_in_tenant(pool, leader_id, tenant_id).await? {
            tracing::warn!(
                leader_id = %leader.id,
                "Falling back to the voter's assigned leader"
            );
            return Ok(Some(leader));
        }
    }

    if let Some(account) = &account {
        tracing::warn!(
            account_id = %account.id,
            "No leader profile resolved, creating one of convenience"
        );
        let leader = create_convenience_profile(pool, tenant_id, account).await?;
        return Ok(Some(leader));
    }

    tracing::warn!(%tenant_id, "No leader resolved, record will be stored without one");
    Ok(None)
}

async fn find_by_account(pool: &PgPool, account_id: Uuid) -> Result<Option<Leader>, ApiError> {
    let sql = format!("SELECT {} FROM leaders WHERE account_id = $1", Leader::COLUMNS);
    let leader =
        sqlx::query_as::<_, Leader>(&sql).bind(account_id).fetch_optional(pool).await?;
    Ok(leader)
}

async fn find_in_tenant(
    pool: &PgPool,
    id: Uuid,
    tenant_id: Uuid,
) -> Result<Option<Leader>, ApiError> {
    let sql =
        format!("SELECT {} FROM leaders WHERE id = $1 AND tenant_id = $2", Leader::COLUMNS);
    let leader = sqlx::query_as::<_, Leader>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?;
    Ok(leader)
}

async fn find_by_contact(
    pool: &PgPool,
    tenant_id: Uuid,
    account: &Account,
) -> Result<Option<Leader>, ApiError> {
    let national_digits = account.national_id.as_deref().map(digits);
    let sql = format!(
        "SELECT {} FROM leaders WHERE tenant_id = $1 AND ( \
         email = $2 OR \
         ($3::text IS NOT NULL AND (national_id = $3 OR regexp_replace(national_id, '[^0-9]', '', 'g') = $4)) \
         ) LIMIT 1",
        Leader::COLUMNS
    );
    let leader = sqlx::query_as::<_, Leader>(&sql)
        .bind(tenant_id)
        .bind(&account.email)
        .bind(&account.national_id)
        .bind(&national_digits)
        .fetch_optional(pool)
        .await?;
    Ok(leader)
}

async fn link_account(
    pool: &PgPool,
    leader: &Leader,
    account_id: Uuid,
) -> Result<Leader, ApiError> {
    if leader.account_id.is_some() {
        return Ok(leader.clone());
    }
    let sql = format!(
        "UPDATE leaders SET account_id = $2, updated_at = now() WHERE id = $1 RETURNING {}",
        Leader::COLUMNS
    );
    let linked = sqlx::query_as::<_, Leader>(&sql)
        .bind(leader.id)
        .bind(account_id)
        .fetch_one(pool)
        .await?;
    Ok(linked)
}

async fn create_convenience_profile(
    pool: &PgPool,
    tenant_id: Uuid,
    account: &Account,
) -> Result<Leader, ApiError> {
    let id = Uuid::new_v4();
    let sql = format!(
        "INSERT INTO leaders \
         (id, name, national_id, phone, email, region, voters_count, voters_goal, active, account_id, tenant_id) \
         VALUES ($1, $2, $3, $4, $5, $6, 0, 0, TRUE, $7, $8) \
         RETURNING {}",
        Leader::COLUMNS
    );
    let leader = sqlx::query_as::<_, Leader>(&sql)
        .bind(id)
        .bind(&account.name)
        .bind(&account.national_id)
        .bind(&account.phone)
        .bind(&account.email)
        .bind(account.region.as_deref().unwrap_or(DEFAULT_REGION))
        .bind(account.id)
        .bind(tenant_id)
        .fetch_one(pool)
        .await?;
    Ok(leader)
}

async fn fetch_account(pool: &PgPool, id: Uuid) -> Result<Option<Account>, ApiError> {
    let sql = format!("SELECT {} FROM accounts WHERE id = $1", Account::COLUMNS);
    let account = sqlx::query_as::<_, Account>(&sql).bind(id).fetch_optional(pool).await?;
    Ok(account)
}

fn digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_strips_formatting() {
        assert_eq!(digits("123.456.789-00"), "12345678900");
        assert_eq!(digits("no numbers"), "");
    }

    #[test]
    fn reference_defaults_to_empty() {
        let reference = LeaderReference::default();
        assert!(reference.leader_id.is_none());
        assert!(reference.account_id.is_none());
    }
}
