use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};

use crate::authz::Principal;
use crate::error::ApiError;

/// Gate for the administrative surface. Layered after the auth middleware,
/// so a missing principal means a wiring mistake and is treated as denied.
pub async fn require_admin_middleware(
    request: Request,
    next: Next,
) -> Result<Response, impl IntoResponse> {
    let is_admin = request
        .extensions()
        .get::<Principal>()
        .map(|p| p.is_admin())
        .unwrap_or(false);

    if !is_admin {
        let api_error = ApiError::forbidden("Administrator access required");
        return Err((
            StatusCode::from_u16(api_error.status_code()).unwrap_or(StatusCode::FORBIDDEN),
            Json(api_error.to_json()),
        ));
    }

    Ok(next.run(request).await)
}
