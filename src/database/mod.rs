pub mod manager;
pub mod models;
pub mod schema;
pub mod scoped;

pub use manager::{DatabaseError, DatabaseManager};
pub use scoped::{ScopedRepository, TenantRow};
