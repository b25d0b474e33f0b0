mod common;

use axum::http::StatusCode;
use mandate_api::authz::Role;
use uuid::Uuid;

#[tokio::test]
async fn protected_routes_require_a_token() {
    for path in ["/api/auth/whoami", "/api/accounts", "/api/voters", "/api/audit"] {
        let response = common::send(common::router(), "GET", path, None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "expected 401 for {}", path);

        let body = common::body_json(response).await;
        assert_eq!(body["error"], true, "error envelope for {}", path);
        assert_eq!(body["code"], "UNAUTHORIZED", "error code for {}", path);
    }
}

#[tokio::test]
async fn garbage_tokens_are_rejected() {
    let response =
        common::send(common::router(), "GET", "/api/auth/whoami", Some("not.a.jwt"), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tampered_tokens_are_rejected() {
    let mut token = common::token_for(Role::Aide);
    token.push('x');
    let response =
        common::send(common::router(), "GET", "/api/auth/whoami", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_echoes_the_principal() {
    let tenant = Uuid::new_v4();
    let token = common::token_for_tenant(Role::Aide, Some(tenant));

    let response =
        common::send(common::router(), "GET", "/api/auth/whoami", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["role"], "aide");
    assert_eq!(body["data"]["effective_tenant_id"], tenant.to_string());
    assert_eq!(body["data"]["email"], "aide@example.com");
}

#[tokio::test]
async fn admin_principal_has_no_tenant() {
    let token = common::token_for(Role::Admin);

    let response =
        common::send(common::router(), "GET", "/api/auth/whoami", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["data"]["role"], "admin");
    assert!(body["data"]["effective_tenant_id"].is_null());
}
