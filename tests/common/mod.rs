// Shared helpers for router tests. Everything here drives the app through
// tower's oneshot, no server process and no database connection: the routes
// under test answer from middleware and handler gates alone.

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use mandate_api::auth::{generate_jwt, Claims};
use mandate_api::authz::{Principal, Role};
use mandate_api::routes::app;

pub fn router() -> Router {
    app()
}

/// Signed token for a throwaway principal of the given role.
pub fn token_for(role: Role) -> String {
    let tenant = match role {
        Role::Admin => None,
        _ => Some(Uuid::new_v4()),
    };
    token_for_tenant(role, tenant)
}

pub fn token_for_tenant(role: Role, tenant: Option<Uuid>) -> String {
    let account_id = Uuid::new_v4();
    let principal = Principal {
        account_id,
        name: format!("{} fixture", role.as_str()),
        email: format!("{}@example.com", role.as_str()),
        role,
        effective_tenant_id: match role {
            Role::OfficeHolder => Some(account_id),
            _ => tenant,
        },
    };
    generate_jwt(Claims::for_principal(&principal)).expect("token generation")
}

pub async fn send(
    router: Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };
    router.oneshot(request).await.expect("router response")
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}
