use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account roles, widest authority first.
///
/// Office-holders are the tenant anchors: every scoped row in the system
/// ultimately points at an office-holder account id. Aides and community
/// leaders work inside one office; admins operate across all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Admin,
    OfficeHolder,
    Aide,
    CommunityLeader,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::OfficeHolder, Role::Aide, Role::CommunityLeader];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::OfficeHolder => "office-holder",
            Role::Aide => "aide",
            Role::CommunityLeader => "community-leader",
        }
    }

    /// Creation hierarchy, consulted before any account insert:
    /// admins create anyone, office-holders hire their own staff, aides may
    /// register community leaders, community leaders create nobody.
    pub fn can_create(&self, target: Role) -> bool {
        match self {
            Role::Admin => true,
            Role::OfficeHolder => matches!(target, Role::Aide | Role::CommunityLeader),
            Role::Aide => matches!(target, Role::CommunityLeader),
            Role::CommunityLeader => false,
        }
    }

    /// Roles allowed on the account-management endpoints (create, list,
    /// edit, delete). Community leaders only ever see their own account.
    pub fn manages_accounts(&self) -> bool {
        matches!(self, Role::Admin | Role::OfficeHolder | Role::Aide)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "office-holder" => Ok(Role::OfficeHolder),
            "aide" => Ok(Role::Aide),
            "community-leader" => Ok(Role::CommunityLeader),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored role string does not match any known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_matrix_is_total() {
        // Every (creator, target) pair must resolve to a defined boolean.
        let expected = [
            (Role::Admin, Role::Admin, true),
            (Role::Admin, Role::OfficeHolder, true),
            (Role::Admin, Role::Aide, true),
            (Role::Admin, Role::CommunityLeader, true),
            (Role::OfficeHolder, Role::Admin, false),
            (Role::OfficeHolder, Role::OfficeHolder, false),
            (Role::OfficeHolder, Role::Aide, true),
            (Role::OfficeHolder, Role::CommunityLeader, true),
            (Role::Aide, Role::Admin, false),
            (Role::Aide, Role::OfficeHolder, false),
            (Role::Aide, Role::Aide, false),
            (Role::Aide, Role::CommunityLeader, true),
            (Role::CommunityLeader, Role::Admin, false),
            (Role::CommunityLeader, Role::OfficeHolder, false),
            (Role::CommunityLeader, Role::Aide, false),
            (Role::CommunityLeader, Role::CommunityLeader, false),
        ];
        for (creator, target, allowed) in expected {
            assert_eq!(creator.can_create(target), allowed, "{} -> {}", creator, target);
        }
    }

    #[test]
    fn round_trips_through_strings() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("mayor".parse::<Role>().is_err());
    }

    #[test]
    fn serde_uses_kebab_case() {
        assert_eq!(serde_json::to_string(&Role::OfficeHolder).unwrap(), "\"office-holder\"");
        let parsed: Role = serde_json::from_str("\"community-leader\"").unwrap();
        assert_eq!(parsed, Role::CommunityLeader);
    }

    #[test]
    fn account_management_gate() {
        assert!(Role::Admin.manages_accounts());
        assert!(Role::OfficeHolder.manages_accounts());
        assert!(Role::Aide.manages_accounts());
        assert!(!Role::CommunityLeader.manages_accounts());
    }
}
