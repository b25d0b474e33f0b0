// handlers/protected/auth.rs - /api/auth

use axum::Extension;

use crate::authz::Principal;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/auth/whoami - echo the authenticated principal
///
/// Clients use this to rehydrate their session after a page reload without
/// decoding the token themselves.
pub async fn whoami(Extension(principal): Extension<Principal>) -> ApiResult<Principal> {
    Ok(ApiResponse::success(principal))
}
