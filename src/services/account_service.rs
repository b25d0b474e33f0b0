use serde::Deserialize;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::authz::{assign_tenant_for_account, NewAccountTenant, Principal, Role};
use crate::database::models::Account;
use crate::database::scoped::TenantRow;
use crate::error::ApiError;
use crate::services::{audit_service, leader_service};
use crate::services::audit_service::NewAuditEntry;
use crate::types::{AuditAction, EntityKind};

#[derive(Debug, Deserialize)]
pub struct CreateAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub tenant_id: Option<Uuid>,
}

/// Update payload. Deliberately has no tenant_id field: ownership is
/// immutable through ordinary updates, rebinding goes through the
/// administrative bind operation.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAccount {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub active: Option<bool>,
}

pub async fn create(
    pool: &PgPool,
    principal: &Principal,
    payload: CreateAccount,
) -> Result<Account, ApiError> {
    let target_role = payload.role.unwrap_or(Role::Aide);

    validate_create(&payload)?;

    // Hierarchy check plus tenant decision in one step
    let binding = assign_tenant_for_account(principal, target_role, payload.tenant_id)?;

    // An admin-supplied binding is the only one not derived from a login,
    // make sure it points at a real office-holder.
    if principal.is_admin() {
        if let NewAccountTenant::Bound(tenant_id) = binding {
            ensure_office_holder(pool, tenant_id).await?;
        }
    }

    check_uniqueness(pool, &payload.email, payload.national_id.as_deref(), None).await?;

    let password_hash = hash_password(&payload.password)?;

    let id = Uuid::new_v4();
    let sql = format!(
        "INSERT INTO accounts \
         (id, name, email, password_hash, national_id, phone, role, region, city, state, active, tenant_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE, $11) \
         RETURNING {}",
        Account::COLUMNS
    );
    let mut account = sqlx::query_as::<_, Account>(&sql)
        .bind(id)
        .bind(payload.name.trim())
        .bind(payload.email.trim())
        .bind(&password_hash)
        .bind(normalize_optional(payload.national_id.as_deref()))
        .bind(&payload.phone)
        .bind(target_role.as_str())
        .bind(&payload.region)
        .bind(&payload.city)
        .bind(&payload.state)
        .bind(binding.initial_value())
        .fetch_one(pool)
        .await?;

    // Office-holders anchor their own tenant once the row id exists
    if binding == NewAccountTenant::SelfAfterInsert {
        sqlx::query("UPDATE accounts SET tenant_id = id, updated_at = now() WHERE id = $1")
            .bind(account.id)
            .execute(pool)
            .await?;
        account.tenant_id = Some(account.id);
    }

    // Every community-leader account gets a companion leader profile
    if target_role == Role::CommunityLeader {
        leader_service::ensure_profile_for_account(pool, &account).await?;
    }

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Create,
            EntityKind::Account,
            format!("Account created: {} ({})", account.name, target_role),
        )
        .entity(account.id)
        .tenant(account.tenant_id)
        .by(principal),
    )
    .await;

    Ok(account)
}

pub async fn list(pool: &PgPool, principal: &Principal) -> Result<Vec<Account>, ApiError> {
    let base = format!("SELECT {} FROM accounts", Account::COLUMNS);
    let accounts = match principal.role {
        Role::Admin => {
            let sql = format!("{} ORDER BY created_at DESC", base);
            sqlx::query_as::<_, Account>(&sql).fetch_all(pool).await?
        }
        Role::OfficeHolder => {
            let sql = format!("{} WHERE tenant_id = $1 ORDER BY created_at DESC", base);
            sqlx::query_as::<_, Account>(&sql)
                .bind(principal.account_id)
                .fetch_all(pool)
                .await?
        }
        Role::Aide => {
            // Aides only ever manage the community leaders of their office
            let sql = format!(
                "{} WHERE tenant_id = $1 AND role = 'community-leader' ORDER BY created_at DESC",
                base
            );
            sqlx::query_as::<_, Account>(&sql)
                .bind(principal.effective_tenant_id)
                .fetch_all(pool)
                .await?
        }
        Role::CommunityLeader => {
            let sql = format!("{} WHERE id = $1", base);
            sqlx::query_as::<_, Account>(&sql)
                .bind(principal.account_id)
                .fetch_all(pool)
                .await?
        }
    };
    Ok(accounts)
}

pub async fn get(pool: &PgPool, principal: &Principal, id: Uuid) -> Result<Account, ApiError> {
    let account = fetch(pool, id).await?;
    authorize_view(principal, &account)?;
    Ok(account)
}

pub async fn update(
    pool: &PgPool,
    principal: &Principal,
    id: Uuid,
    payload: UpdateAccount,
) -> Result<Account, ApiError> {
    let account = fetch(pool, id).await?;
    authorize_edit(principal, &account)?;

    // Role changes are limited to roles the editor could create outright
    if let Some(new_role) = payload.role {
        if !principal.role.can_create(new_role) {
            return Err(ApiError::forbidden(format!(
                "Role '{}' may not assign role '{}'",
                principal.role, new_role
            )));
        }
    }

    if payload.email.is_some() || payload.national_id.is_some() {
        let email = payload.email.as_deref().unwrap_or(&account.email);
        check_uniqueness(pool, email, payload.national_id.as_deref(), Some(id)).await?;
    }

    let password_hash = match payload.password.as_deref() {
        Some(password) if !password.trim().is_empty() => Some(hash_password(password)?),
        _ => None,
    };

    let sql = format!(
        "UPDATE accounts SET \
         name = COALESCE($2, name), \
         email = COALESCE($3, email), \
         password_hash = COALESCE($4, password_hash), \
         role = COALESCE($5, role), \
         national_id = COALESCE($6, national_id), \
         phone = COALESCE($7, phone), \
         region = COALESCE($8, region), \
         city = COALESCE($9, city), \
         state = COALESCE($10, state), \
         active = COALESCE($11, active), \
         updated_at = now() \
         WHERE id = $1 \
         RETURNING {}",
        Account::COLUMNS
    );
    let updated = sqlx::query_as::<_, Account>(&sql)
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&password_hash)
        .bind(payload.role.map(|r| r.as_str()))
        .bind(&payload.national_id)
        .bind(&payload.phone)
        .bind(&payload.region)
        .bind(&payload.city)
        .bind(&payload.state)
        .bind(payload.active)
        .fetch_one(pool)
        .await?;

    // Keep the companion profile in sync for community leaders
    if updated.role == Role::CommunityLeader.as_str() {
        leader_service::sync_profile_for_account(pool, &updated).await?;
    }

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Update,
            EntityKind::Account,
            format!("Account updated: {}", updated.name),
        )
        .entity(updated.id)
        .tenant(updated.tenant_id)
        .by(principal),
    )
    .await;

    Ok(updated)
}

pub async fn remove(pool: &PgPool, principal: &Principal, id: Uuid) -> Result<(), ApiError> {
    let account = fetch(pool, id).await?;
    authorize_delete(principal, &account)?;

    // Community-leader accounts take their companion profile with them
    if account.role == Role::CommunityLeader.as_str() {
        leader_service::delete_profile_for_account(pool, account.id).await?;
    }

    sqlx::query("DELETE FROM accounts WHERE id = $1").bind(id).execute(pool).await?;

    audit_service::record(
        pool,
        NewAuditEntry::new(
            AuditAction::Delete,
            EntityKind::Account,
            format!("Account deleted: {}", account.name),
        )
        .entity(account.id)
        .tenant(account.tenant_id)
        .by(principal),
    )
    .await;

    Ok(())
}

/// All office-holder accounts, the roster of tenants. Admin overview only.
pub async fn list_office_holders(pool: &PgPool) -> Result<Vec<Account>, ApiError> {
    let sql = format!(
        "SELECT {} FROM accounts WHERE role = 'office-holder' ORDER BY created_at DESC",
        Account::COLUMNS
    );
    let accounts = sqlx::query_as::<_, Account>(&sql).fetch_all(pool).await?;
    Ok(accounts)
}

/// Login-time lookup, unscoped by design.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Account>, ApiError> {
    let sql = format!("SELECT {} FROM accounts WHERE email = $1", Account::COLUMNS);
    let account = sqlx::query_as::<_, Account>(&sql).bind(email).fetch_optional(pool).await?;
    Ok(account)
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, ApiError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn national_id_exists(pool: &PgPool, national_id: &str) -> Result<bool, ApiError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE national_id = $1")
        .bind(national_id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

async fn fetch(pool: &PgPool, id: Uuid) -> Result<Account, ApiError> {
    let sql = format!("SELECT {} FROM accounts WHERE id = $1", Account::COLUMNS);
    sqlx::query_as::<_, Account>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Account not found"))
}

async fn ensure_office_holder(pool: &PgPool, tenant_id: Uuid) -> Result<(), ApiError> {
    let role: Option<String> = sqlx::query_scalar("SELECT role FROM accounts WHERE id = $1")
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?;
    match role.as_deref() {
        Some("office-holder") => Ok(()),
        Some(_) => Err(ApiError::bad_request("Tenant id must reference an office-holder account")),
        None => Err(ApiError::bad_request("Tenant id does not reference any account")),
    }
}

async fn check_uniqueness(
    pool: &PgPool,
    email: &str,
    national_id: Option<&str>,
    exclude: Option<Uuid>,
) -> Result<(), ApiError> {
    let existing = sqlx::query_as::<_, (String, Option<String>)>(
        "SELECT email, national_id FROM accounts \
         WHERE (email = $1 OR (national_id IS NOT NULL AND national_id = $2)) \
         AND ($3::uuid IS NULL OR id <> $3)",
    )
    .bind(email)
    .bind(national_id)
    .bind(exclude)
    .fetch_optional(pool)
    .await?;

    match existing {
        Some((found_email, _)) if found_email == email => {
            Err(ApiError::conflict("An account with this email already exists"))
        }
        Some(_) => Err(ApiError::conflict("An account with this national id already exists")),
        None => Ok(()),
    }
}

fn validate_create(payload: &CreateAccount) -> Result<(), ApiError> {
    let mut field_errors = HashMap::new();
    if payload.name.trim().is_empty() {
        field_errors.insert("name".to_string(), "Name is required".to_string());
    }
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        field_errors.insert("email".to_string(), "A valid email is required".to_string());
    }
    if payload.password.trim().is_empty() {
        field_errors.insert("password".to_string(), "Password is required".to_string());
    }
    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Invalid account payload", Some(field_errors)))
    }
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let cost = crate::config::config().security.bcrypt_cost;
    bcrypt::hash(password, cost).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal_server_error("Could not process password")
    })
}

fn normalize_optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn authorize_view(viewer: &Principal, account: &Account) -> Result<(), ApiError> {
    if account.id == viewer.account_id {
        return Ok(());
    }
    match viewer.role {
        Role::Admin => Ok(()),
        Role::OfficeHolder => {
            if account.tenant_id == Some(viewer.account_id) {
                Ok(())
            } else {
                Err(ApiError::forbidden("Access denied to this account"))
            }
        }
        Role::Aide => {
            let same_office = account.tenant_id == viewer.effective_tenant_id;
            if same_office && account.role == Role::CommunityLeader.as_str() {
                Ok(())
            } else {
                Err(ApiError::forbidden("Access denied to this account"))
            }
        }
        Role::CommunityLeader => Err(ApiError::forbidden("Access denied to this account")),
    }
}

fn authorize_edit(editor: &Principal, account: &Account) -> Result<(), ApiError> {
    match editor.role {
        Role::Admin => Ok(()),
        Role::OfficeHolder => {
            if account.tenant_id == Some(editor.account_id) {
                Ok(())
            } else {
                Err(ApiError::forbidden("Access denied to this account"))
            }
        }
        Role::Aide => {
            let same_office = account.tenant_id == editor.effective_tenant_id;
            if same_office && account.role == Role::CommunityLeader.as_str() {
                Ok(())
            } else {
                Err(ApiError::forbidden("Aides may only edit community leaders"))
            }
        }
        Role::CommunityLeader => Err(ApiError::forbidden("Access denied to this account")),
    }
}

fn authorize_delete(deleter: &Principal, account: &Account) -> Result<(), ApiError> {
    match deleter.role {
        Role::Admin => Ok(()),
        Role::OfficeHolder | Role::Aide => {
            let own_office = match deleter.role {
                Role::OfficeHolder => Some(deleter.account_id),
                _ => deleter.effective_tenant_id,
            };
            if account.tenant_id != own_office {
                return Err(ApiError::forbidden("Access denied to this account"));
            }
            if account.id == deleter.account_id {
                return Err(ApiError::forbidden("You cannot delete your own account"));
            }
            if deleter.role == Role::Aide && account.role != Role::CommunityLeader.as_str() {
                return Err(ApiError::forbidden("Aides may only delete community leaders"));
            }
            Ok(())
        }
        Role::CommunityLeader => Err(ApiError::forbidden("Access denied to this account")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::principal::fixtures;
    use chrono::Utc;

    fn stored_account(role: Role, tenant_id: Option<Uuid>) -> Account {
        Account {
            id: Uuid::new_v4(),
            name: "Target".to_string(),
            email: "target@example.com".to_string(),
            password_hash: String::new(),
            national_id: None,
            phone: None,
            role: role.as_str().to_string(),
            region: None,
            city: None,
            state: None,
            active: true,
            tenant_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn office_holder_views_only_own_staff() {
        let holder = fixtures::office_holder(Uuid::new_v4());
        let own = stored_account(Role::Aide, Some(holder.account_id));
        let foreign = stored_account(Role::Aide, Some(Uuid::new_v4()));

        assert!(authorize_view(&holder, &own).is_ok());
        assert!(authorize_view(&holder, &foreign).is_err());
    }

    #[test]
    fn aide_views_only_leaders_of_own_office() {
        let tenant = Uuid::new_v4();
        let aide = fixtures::aide(tenant);

        let leader = stored_account(Role::CommunityLeader, Some(tenant));
        let other_aide = stored_account(Role::Aide, Some(tenant));
        let foreign_leader = stored_account(Role::CommunityLeader, Some(Uuid::new_v4()));

        assert!(authorize_view(&aide, &leader).is_ok());
        assert!(authorize_view(&aide, &other_aide).is_err());
        assert!(authorize_view(&aide, &foreign_leader).is_err());
    }

    #[test]
    fn everyone_views_themselves() {
        let tenant = Uuid::new_v4();
        let leader = fixtures::community_leader(tenant);
        let mut own_row = stored_account(Role::CommunityLeader, Some(tenant));
        own_row.id = leader.account_id;

        assert!(authorize_view(&leader, &own_row).is_ok());
        let someone_else = stored_account(Role::CommunityLeader, Some(tenant));
        assert!(authorize_view(&leader, &someone_else).is_err());
    }

    #[test]
    fn aide_edits_are_limited_to_leaders() {
        let tenant = Uuid::new_v4();
        let aide = fixtures::aide(tenant);

        assert!(authorize_edit(&aide, &stored_account(Role::CommunityLeader, Some(tenant))).is_ok());
        assert!(authorize_edit(&aide, &stored_account(Role::Aide, Some(tenant))).is_err());
    }

    #[test]
    fn no_self_delete_below_admin() {
        let holder = fixtures::office_holder(Uuid::new_v4());
        let mut own_row = stored_account(Role::OfficeHolder, Some(holder.account_id));
        own_row.id = holder.account_id;

        let err = authorize_delete(&holder, &own_row).unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn create_payload_validation_collects_field_errors() {
        let payload = CreateAccount {
            name: " ".to_string(),
            email: "not-an-email".to_string(),
            password: String::new(),
            role: None,
            national_id: None,
            phone: None,
            region: None,
            city: None,
            state: None,
            tenant_id: None,
        };
        let err = validate_create(&payload).unwrap_err();
        assert_eq!(err.status_code(), 400);
        let body = err.to_json();
        assert!(body["field_errors"]["name"].is_string());
        assert!(body["field_errors"]["email"].is_string());
        assert!(body["field_errors"]["password"].is_string());
    }

    #[test]
    fn optional_strings_normalize_to_none() {
        assert_eq!(normalize_optional(Some("  ")), None);
        assert_eq!(normalize_optional(Some(" 123 ")), Some("123".to_string()));
        assert_eq!(normalize_optional(None), None);
    }
}
