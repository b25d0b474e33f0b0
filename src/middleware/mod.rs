pub mod admin;
pub mod auth;
pub mod response;

pub use admin::require_admin_middleware;
pub use auth::principal_middleware;
pub use response::{ApiResponse, ApiResult};
