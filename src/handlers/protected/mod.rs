// handlers/protected/mod.rs - JWT-protected handlers (/api/*)
//
// Every handler here runs behind the principal middleware and receives the
// authenticated Principal as a request extension. Record visibility is
// enforced in the services; handlers add the per-route role gates.

pub mod accounts;
pub mod amendments;
pub mod appointments;
pub mod audit;
pub mod auth;
pub mod help_records;
pub mod leaders;
pub mod projects;
pub mod visits;
pub mod voters;
