pub mod account_service;
pub mod amendment_service;
pub mod appointment_service;
pub mod audit_service;
pub mod help_record_service;
pub mod leader_service;
pub mod migration_service;
pub mod project_service;
pub mod visit_service;
pub mod voter_service;
