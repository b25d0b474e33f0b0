use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;
use super::scope::TenantScope;

/// Authenticated caller identity, embedded in the session token at login.
///
/// `effective_tenant_id` is `None` only for admins. For everyone else the
/// resolver guarantees a concrete office binding before a principal is
/// issued, so downstream code can treat `None` as "sees every tenant".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub account_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub effective_tenant_id: Option<Uuid>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn scope(&self) -> TenantScope {
        TenantScope::for_principal(self)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn admin() -> Principal {
        Principal {
            account_id: Uuid::new_v4(),
            name: "Root Admin".to_string(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
            effective_tenant_id: None,
        }
    }

    pub fn office_holder(id: Uuid) -> Principal {
        Principal {
            account_id: id,
            name: "Office Holder".to_string(),
            email: "holder@example.com".to_string(),
            role: Role::OfficeHolder,
            effective_tenant_id: Some(id),
        }
    }

    pub fn aide(tenant: Uuid) -> Principal {
        Principal {
            account_id: Uuid::new_v4(),
            name: "Aide".to_string(),
            email: "aide@example.com".to_string(),
            role: Role::Aide,
            effective_tenant_id: Some(tenant),
        }
    }

    pub fn community_leader(tenant: Uuid) -> Principal {
        Principal {
            account_id: Uuid::new_v4(),
            name: "Community Leader".to_string(),
            email: "leader@example.com".to_string(),
            role: Role::CommunityLeader,
            effective_tenant_id: Some(tenant),
        }
    }
}
