mod common;

use axum::http::StatusCode;
use mandate_api::authz::Role;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn root_surface_requires_a_token() {
    let response = common::send(common::router(), "GET", "/api/root/tenants", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn root_surface_rejects_every_non_admin_role() {
    for role in [Role::OfficeHolder, Role::Aide, Role::CommunityLeader] {
        let token = common::token_for(role);
        let response =
            common::send(common::router(), "GET", "/api/root/orphans", Some(&token), None).await;
        assert_eq!(
            response.status(),
            StatusCode::FORBIDDEN,
            "expected 403 for {}",
            role.as_str()
        );

        let payload = common::body_json(response).await;
        assert_eq!(payload["message"], "Administrator access required");
        assert_eq!(payload["code"], "FORBIDDEN");
    }
}

#[tokio::test]
async fn bind_is_gated_before_the_handler_runs() {
    let token = common::token_for(Role::OfficeHolder);
    let response = common::send(
        common::router(),
        "POST",
        &format!("/api/root/accounts/{}/bind", Uuid::new_v4()),
        Some(&token),
        Some(json!({ "tenant_id": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn migrate_validates_the_tenant_id_segment() {
    let token = common::token_for(Role::Admin);
    let response = common::send(
        common::router(),
        "POST",
        "/api/root/orphans/migrate/not-a-uuid",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
