// handlers/public/mod.rs - public handlers (no authentication required)
//
// Token acquisition and service status. Everything else lives behind JWT.

pub mod auth;

pub use auth::*;
