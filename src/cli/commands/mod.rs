pub mod account;
pub mod auth;
pub mod orphan;
pub mod tenant;
