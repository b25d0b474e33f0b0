use thiserror::Error;
use uuid::Uuid;

use super::principal::Principal;
use super::role::Role;
use crate::database::models::Account;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("account is deactivated")]
    Inactive,
    #[error("account {account_id} carries unknown role '{role}'")]
    UnknownRole { account_id: Uuid, role: String },
    #[error("account {account_id} has no tenant binding")]
    UnboundAccount { account_id: Uuid },
}

/// Turns a credential-verified account row into the principal embedded in
/// the session token.
///
/// Runs once per login. The tenant binding rides inside the token, so
/// rebinding an account takes effect on the next login, not mid-session.
pub fn resolve_principal(account: &Account) -> Result<Principal, ResolveError> {
    if !account.active {
        return Err(ResolveError::Inactive);
    }

    let role: Role = account.role.parse().map_err(|super::role::UnknownRole(role)| {
        ResolveError::UnknownRole { account_id: account.id, role }
    })?;

    let effective_tenant_id = match role {
        Role::Admin => None,
        Role::OfficeHolder => Some(account.id),
        Role::Aide | Role::CommunityLeader => Some(
            account
                .tenant_id
                .ok_or(ResolveError::UnboundAccount { account_id: account.id })?,
        ),
    };

    Ok(Principal {
        account_id: account.id,
        name: account.name.clone(),
        email: account.email.clone(),
        role,
        effective_tenant_id,
    })
}

/// The tenant id a session for this account would be scoped to. `None`
/// means unrestricted (admins only).
pub fn resolve_effective_tenant(account: &Account) -> Result<Option<Uuid>, ResolveError> {
    resolve_principal(account).map(|p| p.effective_tenant_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(role: &str, tenant_id: Option<Uuid>, active: bool) -> Account {
        Account {
            id: Uuid::new_v4(),
            name: "Someone".to_string(),
            email: "someone@example.com".to_string(),
            password_hash: String::new(),
            national_id: None,
            phone: None,
            role: role.to_string(),
            region: None,
            city: None,
            state: None,
            active,
            tenant_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admin_resolves_unrestricted() {
        let acc = account("admin", None, true);
        assert_eq!(resolve_effective_tenant(&acc).unwrap(), None);
    }

    #[test]
    fn office_holder_is_their_own_tenant() {
        let acc = account("office-holder", None, true);
        assert_eq!(resolve_effective_tenant(&acc).unwrap(), Some(acc.id));

        // A stale stored binding never overrides the self-tenant rule.
        let other = Uuid::new_v4();
        let acc = account("office-holder", Some(other), true);
        assert_eq!(resolve_effective_tenant(&acc).unwrap(), Some(acc.id));
    }

    #[test]
    fn staff_inherit_their_stored_binding() {
        let tenant = Uuid::new_v4();
        let aide = account("aide", Some(tenant), true);
        assert_eq!(resolve_effective_tenant(&aide).unwrap(), Some(tenant));

        let leader = account("community-leader", Some(tenant), true);
        assert_eq!(resolve_effective_tenant(&leader).unwrap(), Some(tenant));
    }

    #[test]
    fn unbound_staff_cannot_log_in() {
        let aide = account("aide", None, true);
        assert!(matches!(
            resolve_principal(&aide),
            Err(ResolveError::UnboundAccount { .. })
        ));
    }

    #[test]
    fn inactive_accounts_are_rejected_first() {
        let acc = account("admin", None, false);
        assert_eq!(resolve_principal(&acc).unwrap_err(), ResolveError::Inactive);
    }

    #[test]
    fn garbage_role_is_fatal() {
        let acc = account("mayor", None, true);
        assert!(matches!(
            resolve_principal(&acc),
            Err(ResolveError::UnknownRole { .. })
        ));
    }

    #[test]
    fn principal_carries_identity_fields() {
        let acc = account("office-holder", None, true);
        let principal = resolve_principal(&acc).unwrap();
        assert_eq!(principal.account_id, acc.id);
        assert_eq!(principal.role, Role::OfficeHolder);
        assert_eq!(principal.name, acc.name);
        assert_eq!(principal.email, acc.email);
    }
}
