// Access-control core shared by every business module: role hierarchy,
// login-time tenant resolution, per-request scope checks and ownership
// assignment for new rows.
pub mod ownership;
pub mod principal;
pub mod resolver;
pub mod role;
pub mod scope;

pub use ownership::{assign_tenant, assign_tenant_for_account, AssignError, NewAccountTenant};
pub use principal::Principal;
pub use resolver::{resolve_effective_tenant, resolve_principal, ResolveError};
pub use role::Role;
pub use scope::{authorize_record_access, ScopeError, TenantScope};
