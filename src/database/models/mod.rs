pub mod account;
pub mod amendment;
pub mod appointment;
pub mod audit_entry;
pub mod help_record;
pub mod law_project;
pub mod leader;
pub mod visit;
pub mod voter;

pub use account::Account;
pub use amendment::Amendment;
pub use appointment::Appointment;
pub use audit_entry::AuditEntry;
pub use help_record::HelpRecord;
pub use law_project::LawProject;
pub use leader::Leader;
pub use visit::Visit;
pub use voter::Voter;
