// handlers/elevated/root/tenant/mod.rs

pub mod list;

pub use list::tenant_list;
