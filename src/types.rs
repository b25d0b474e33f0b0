/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tenant-scoped record kinds managed by the system.
///
/// This is the closed set the orphan migration walks and the audit trail
/// reports on. Adding a table means adding a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Account,
    Leader,
    Voter,
    Visit,
    HelpRecord,
    Appointment,
    LawProject,
    Amendment,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Account,
        EntityKind::Leader,
        EntityKind::Voter,
        EntityKind::Visit,
        EntityKind::HelpRecord,
        EntityKind::Appointment,
        EntityKind::LawProject,
        EntityKind::Amendment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Account => "account",
            EntityKind::Leader => "leader",
            EntityKind::Voter => "voter",
            EntityKind::Visit => "visit",
            EntityKind::HelpRecord => "help-record",
            EntityKind::Appointment => "appointment",
            EntityKind::LawProject => "law-project",
            EntityKind::Amendment => "amendment",
        }
    }

    /// Backing table name. Identifiers are fixed at compile time, never
    /// interpolated from request input.
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Account => "accounts",
            EntityKind::Leader => "leaders",
            EntityKind::Voter => "voters",
            EntityKind::Visit => "visits",
            EntityKind::HelpRecord => "help_records",
            EntityKind::Appointment => "appointments",
            EntityKind::LawProject => "law_projects",
            EntityKind::Amendment => "amendments",
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "account" | "accounts" => Ok(EntityKind::Account),
            "leader" | "leaders" => Ok(EntityKind::Leader),
            "voter" | "voters" => Ok(EntityKind::Voter),
            "visit" | "visits" => Ok(EntityKind::Visit),
            "help-record" | "help-records" => Ok(EntityKind::HelpRecord),
            "appointment" | "appointments" => Ok(EntityKind::Appointment),
            "law-project" | "law-projects" => Ok(EntityKind::LawProject),
            "amendment" | "amendments" => Ok(EntityKind::Amendment),
            other => Err(format!("unknown entity kind '{}'", other)),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit trail actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Login,
    Migrate,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Login => "login",
            AuditAction::Migrate => "migrate",
        }
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(AuditAction::Create),
            "update" => Ok(AuditAction::Update),
            "delete" => Ok(AuditAction::Delete),
            "login" => Ok(AuditAction::Login),
            "migrate" => Ok(AuditAction::Migrate),
            other => Err(format!("unknown audit action '{}'", other)),
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_parses_both_singular_and_plural() {
        assert_eq!("voter".parse::<EntityKind>().unwrap(), EntityKind::Voter);
        assert_eq!("voters".parse::<EntityKind>().unwrap(), EntityKind::Voter);
        assert_eq!("help-records".parse::<EntityKind>().unwrap(), EntityKind::HelpRecord);
        assert!("ballots".parse::<EntityKind>().is_err());
    }

    #[test]
    fn table_names_are_fixed() {
        for kind in EntityKind::ALL {
            assert!(kind.table().chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
