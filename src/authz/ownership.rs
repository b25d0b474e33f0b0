use thiserror::Error;
use uuid::Uuid;

use super::principal::Principal;
use super::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AssignError {
    #[error("an explicit tenant id is required")]
    TenantRequired,
    #[error("role '{creator}' may not create role '{target}'")]
    RoleNotGranted { creator: Role, target: Role },
}

/// Owner for a new tenant-scoped business row.
///
/// Admins must name the office the row belongs to. Everyone else writes into
/// their own office, and any tenant id the request body carried is discarded
/// so a confused client cannot write across tenants.
pub fn assign_tenant(creator: &Principal, requested: Option<Uuid>) -> Result<Uuid, AssignError> {
    match creator.role {
        Role::Admin => requested.ok_or(AssignError::TenantRequired),
        Role::OfficeHolder => Ok(creator.account_id),
        // Resolver guarantees a binding for these roles, the error arm is
        // unreachable for principals it issued.
        Role::Aide | Role::CommunityLeader => {
            creator.effective_tenant_id.ok_or(AssignError::TenantRequired)
        }
    }
}

/// Tenant binding decided for a new account row before it is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewAccountTenant {
    /// Insert with this binding.
    Bound(Uuid),
    /// Admin accounts stay unbound.
    Unbound,
    /// Office-holders anchor their own tenant, so the binding is patched to
    /// the fresh row id right after the insert.
    SelfAfterInsert,
}

impl NewAccountTenant {
    /// Value stored on the initial insert. `SelfAfterInsert` starts null and
    /// is fixed up once the row id exists.
    pub fn initial_value(&self) -> Option<Uuid> {
        match self {
            NewAccountTenant::Bound(id) => Some(*id),
            NewAccountTenant::Unbound | NewAccountTenant::SelfAfterInsert => None,
        }
    }
}

/// Tenant binding for a new account, checked against the creation hierarchy.
///
/// An admin must name the office when creating aides or community leaders.
/// When creating an office-holder the requested id is ignored outright: the
/// new account always anchors itself, never another office.
pub fn assign_tenant_for_account(
    creator: &Principal,
    target: Role,
    requested: Option<Uuid>,
) -> Result<NewAccountTenant, AssignError> {
    if !creator.role.can_create(target) {
        return Err(AssignError::RoleNotGranted { creator: creator.role, target });
    }

    match creator.role {
        Role::Admin => match target {
            Role::OfficeHolder => Ok(NewAccountTenant::SelfAfterInsert),
            Role::Admin => Ok(match requested {
                Some(id) => NewAccountTenant::Bound(id),
                None => NewAccountTenant::Unbound,
            }),
            Role::Aide | Role::CommunityLeader => {
                requested.map(NewAccountTenant::Bound).ok_or(AssignError::TenantRequired)
            }
        },
        Role::OfficeHolder => Ok(NewAccountTenant::Bound(creator.account_id)),
        Role::Aide => {
            creator.effective_tenant_id.map(NewAccountTenant::Bound).ok_or(AssignError::TenantRequired)
        }
        // can_create already rejected this creator
        Role::CommunityLeader => Err(AssignError::RoleNotGranted { creator: creator.role, target }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::principal::fixtures;

    #[test]
    fn admin_must_name_a_tenant_for_records() {
        let admin = fixtures::admin();
        assert_eq!(assign_tenant(&admin, None), Err(AssignError::TenantRequired));

        let target = Uuid::new_v4();
        assert_eq!(assign_tenant(&admin, Some(target)), Ok(target));
    }

    #[test]
    fn office_holder_writes_into_own_office_only() {
        let holder = fixtures::office_holder(Uuid::new_v4());
        let foreign = Uuid::new_v4();
        // Requested value is discarded, not honored.
        assert_eq!(assign_tenant(&holder, Some(foreign)), Ok(holder.account_id));
        assert_eq!(assign_tenant(&holder, None), Ok(holder.account_id));
    }

    #[test]
    fn aide_inherits_login_binding() {
        let tenant = Uuid::new_v4();
        let aide = fixtures::aide(tenant);
        assert_eq!(assign_tenant(&aide, Some(Uuid::new_v4())), Ok(tenant));
    }

    #[test]
    fn creation_hierarchy_is_enforced_first() {
        let aide = fixtures::aide(Uuid::new_v4());
        let err = assign_tenant_for_account(&aide, Role::OfficeHolder, None).unwrap_err();
        assert_eq!(err, AssignError::RoleNotGranted { creator: Role::Aide, target: Role::OfficeHolder });

        let leader = fixtures::community_leader(Uuid::new_v4());
        assert!(assign_tenant_for_account(&leader, Role::CommunityLeader, None).is_err());
    }

    #[test]
    fn admin_creating_office_holder_self_binds_after_insert() {
        let admin = fixtures::admin();
        // Even an explicit foreign id is ignored for office-holder targets.
        let decision = assign_tenant_for_account(&admin, Role::OfficeHolder, Some(Uuid::new_v4()));
        assert_eq!(decision, Ok(NewAccountTenant::SelfAfterInsert));
        assert_eq!(NewAccountTenant::SelfAfterInsert.initial_value(), None);
    }

    #[test]
    fn admin_creating_staff_requires_explicit_tenant() {
        let admin = fixtures::admin();
        assert_eq!(
            assign_tenant_for_account(&admin, Role::Aide, None),
            Err(AssignError::TenantRequired)
        );

        let tenant = Uuid::new_v4();
        assert_eq!(
            assign_tenant_for_account(&admin, Role::CommunityLeader, Some(tenant)),
            Ok(NewAccountTenant::Bound(tenant))
        );
    }

    #[test]
    fn admin_creating_admin_stays_unbound_by_default() {
        let admin = fixtures::admin();
        assert_eq!(assign_tenant_for_account(&admin, Role::Admin, None), Ok(NewAccountTenant::Unbound));
    }

    #[test]
    fn staff_creators_force_their_own_tenant() {
        let holder = fixtures::office_holder(Uuid::new_v4());
        assert_eq!(
            assign_tenant_for_account(&holder, Role::Aide, Some(Uuid::new_v4())),
            Ok(NewAccountTenant::Bound(holder.account_id))
        );

        let tenant = Uuid::new_v4();
        let aide = fixtures::aide(tenant);
        assert_eq!(
            assign_tenant_for_account(&aide, Role::CommunityLeader, Some(Uuid::new_v4())),
            Ok(NewAccountTenant::Bound(tenant))
        );
    }
}
