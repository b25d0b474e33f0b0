use thiserror::Error;
use uuid::Uuid;

use super::principal::Principal;

/// Visibility window for one principal, fixed at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantScope {
    /// Admin view. No tenant filter is applied anywhere.
    Unrestricted,
    /// Everything owned by the named office-holder, nothing else.
    Tenant(Uuid),
}

/// Errors from scoped record access. `NotFound` is reported before
/// `OutsideTenant` so a caller probing foreign ids learns existence at most,
/// never content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("record not found")]
    NotFound,
    #[error("access denied to this record")]
    OutsideTenant,
}

impl TenantScope {
    pub fn for_principal(principal: &Principal) -> Self {
        match principal.effective_tenant_id {
            None => TenantScope::Unrestricted,
            Some(id) => TenantScope::Tenant(id),
        }
    }

    /// Tenant id that list queries must filter by. `None` means no filter.
    pub fn filter(&self) -> Option<Uuid> {
        match self {
            TenantScope::Unrestricted => None,
            TenantScope::Tenant(id) => Some(*id),
        }
    }

    /// Whether a row owned by `record_tenant` is visible in this scope.
    /// Orphan rows (`None`, legacy data awaiting migration) are visible to
    /// admins only.
    pub fn allows(&self, record_tenant: Option<Uuid>) -> bool {
        match self {
            TenantScope::Unrestricted => true,
            TenantScope::Tenant(id) => record_tenant == Some(*id),
        }
    }
}

/// Scope check applied to every single-record read, update and delete once
/// the row has been fetched. Missing ids never reach this function; the
/// repository reports `NotFound` first.
pub fn authorize_record_access(
    principal: &Principal,
    record_tenant: Option<Uuid>,
) -> Result<(), ScopeError> {
    if TenantScope::for_principal(principal).allows(record_tenant) {
        Ok(())
    } else {
        Err(ScopeError::OutsideTenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::principal::fixtures;

    #[test]
    fn admin_scope_is_unrestricted() {
        let admin = fixtures::admin();
        assert_eq!(TenantScope::for_principal(&admin), TenantScope::Unrestricted);
        assert_eq!(admin.scope().filter(), None);
        assert!(admin.scope().allows(Some(Uuid::new_v4())));
        assert!(admin.scope().allows(None));
    }

    #[test]
    fn tenant_scope_matches_exact_owner() {
        let tenant = Uuid::new_v4();
        let aide = fixtures::aide(tenant);
        assert_eq!(aide.scope().filter(), Some(tenant));
        assert!(aide.scope().allows(Some(tenant)));
        assert!(!aide.scope().allows(Some(Uuid::new_v4())));
    }

    #[test]
    fn orphan_rows_hidden_from_tenant_scopes() {
        let holder = fixtures::office_holder(Uuid::new_v4());
        assert!(!holder.scope().allows(None));
    }

    #[test]
    fn access_check_follows_scope() {
        let tenant = Uuid::new_v4();
        let holder = fixtures::office_holder(tenant);

        assert!(authorize_record_access(&holder, Some(tenant)).is_ok());
        assert_eq!(
            authorize_record_access(&holder, Some(Uuid::new_v4())),
            Err(ScopeError::OutsideTenant)
        );
        assert!(authorize_record_access(&fixtures::admin(), Some(Uuid::new_v4())).is_ok());
    }
}
