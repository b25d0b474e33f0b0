mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn banner_describes_the_surface() {
    let response = common::send(common::router(), "GET", "/", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Mandate API");
    assert!(body["data"]["version"].is_string());
    assert!(body["data"]["endpoints"]["login"].is_string());
    assert!(body["data"]["endpoints"]["root"].is_string());
}

#[tokio::test]
async fn unknown_routes_are_404() {
    let response = common::send(common::router(), "GET", "/api/nonsense", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_is_post_only() {
    let response = common::send(common::router(), "GET", "/auth/login", None, None).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn login_rejects_malformed_bodies() {
    // Missing password never reaches credential checking
    let response = common::send(
        common::router(),
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "someone@example.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
