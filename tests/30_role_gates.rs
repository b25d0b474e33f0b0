mod common;

use axum::http::StatusCode;
use mandate_api::authz::Role;
use serde_json::{json, Value};
use uuid::Uuid;

// The handler gates run before any storage access, so a denied role gets
// its 403 without a database in sight. That property is what these tests
// lean on.
async fn expect_forbidden(role: Role, method: &str, path: &str, body: Option<Value>) {
    let token = common::token_for(role);
    let response = common::send(common::router(), method, path, Some(&token), body).await;
    assert_eq!(
        response.status(),
        StatusCode::FORBIDDEN,
        "expected 403 for {} {} as {}",
        method,
        path,
        role.as_str()
    );

    let payload = common::body_json(response).await;
    assert_eq!(payload["error"], true);
    assert_eq!(payload["code"], "FORBIDDEN");
    assert!(payload["message"].is_string());
}

#[tokio::test]
async fn community_leaders_cannot_manage_accounts() {
    expect_forbidden(Role::CommunityLeader, "GET", "/api/accounts", None).await;
    expect_forbidden(
        Role::CommunityLeader,
        "POST",
        "/api/accounts",
        Some(json!({
            "name": "New Aide",
            "email": "new-aide@example.com",
            "password": "secret123"
        })),
    )
    .await;
    expect_forbidden(
        Role::CommunityLeader,
        "GET",
        "/api/accounts/check/email/anyone@example.com",
        None,
    )
    .await;
}

#[tokio::test]
async fn community_leaders_cannot_reshape_the_leader_roster() {
    expect_forbidden(
        Role::CommunityLeader,
        "POST",
        "/api/leaders",
        Some(json!({ "name": "Another Leader" })),
    )
    .await;
    expect_forbidden(
        Role::CommunityLeader,
        "DELETE",
        &format!("/api/leaders/{}", Uuid::new_v4()),
        None,
    )
    .await;
}

#[tokio::test]
async fn help_records_are_locked_to_staff() {
    expect_forbidden(Role::CommunityLeader, "GET", "/api/help-records", None).await;
    expect_forbidden(
        Role::CommunityLeader,
        "POST",
        "/api/help-records",
        Some(json!({ "voter_id": Uuid::new_v4() })),
    )
    .await;
}

#[tokio::test]
async fn amendments_are_locked_to_staff() {
    expect_forbidden(Role::CommunityLeader, "GET", "/api/amendments", None).await;
    expect_forbidden(
        Role::CommunityLeader,
        "GET",
        &format!("/api/amendments/{}", Uuid::new_v4()),
        None,
    )
    .await;
}

#[tokio::test]
async fn community_leaders_cannot_touch_agenda_or_projects() {
    expect_forbidden(Role::CommunityLeader, "POST", "/api/appointments", Some(json!({}))).await;
    expect_forbidden(
        Role::CommunityLeader,
        "POST",
        "/api/law-projects",
        Some(json!({
            "number": "123/2025",
            "title": "Street lighting",
            "summary": "Expand coverage",
            "protocol_date": "2025-03-01"
        })),
    )
    .await;
    expect_forbidden(
        Role::CommunityLeader,
        "DELETE",
        &format!("/api/appointments/{}", Uuid::new_v4()),
        None,
    )
    .await;
}

#[tokio::test]
async fn audit_clear_is_for_admins_and_office_holders_only() {
    expect_forbidden(Role::Aide, "DELETE", "/api/audit", None).await;
    expect_forbidden(Role::CommunityLeader, "DELETE", "/api/audit", None).await;
}

#[tokio::test]
async fn audit_filters_reject_unknown_names() {
    let token = common::token_for(Role::OfficeHolder);

    let response = common::send(
        common::router(),
        "GET",
        "/api/audit/entity/ballots",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = common::send(
        common::router(),
        "GET",
        "/api/audit/action/exported",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
