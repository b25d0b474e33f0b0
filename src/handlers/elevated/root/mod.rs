// handlers/elevated/root/mod.rs - cross-tenant administration
//
// Tenant roster, orphan reporting and migration, and manual account
// binding. These are the only places the tenant scope is bypassed.

pub mod account;
pub mod orphan;
pub mod tenant;
