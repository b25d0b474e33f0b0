// routes.rs - HTTP surface assembly
//
// Three tiers, matching the handler tree: public routes, /api/* behind the
// principal middleware, /api/root/* behind the admin gate on top of it.
// Lives in the library so integration tests can drive the router directly.

use axum::http::HeaderValue;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config;
use crate::middleware::{principal_middleware, require_admin_middleware};

pub fn app() -> Router {
    let protected = protected_routes().layer(from_fn(principal_middleware));

    // Outermost layer runs first: principal extraction, then the admin gate
    let elevated = elevated_routes()
        .layer(from_fn(require_admin_middleware))
        .layer(from_fn(principal_middleware));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        .merge(protected)
        .merge(elevated)
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use crate::handlers::public::auth;

    Router::new().route("/auth/login", post(auth::login_post))
}

fn protected_routes() -> Router {
    use crate::handlers::protected::{
        accounts, amendments, appointments, audit, auth, help_records, leaders, projects, visits,
        voters,
    };

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        // Accounts: the check routes must sit above /:id so the literal
        // segment wins
        .route("/api/accounts", get(accounts::list).post(accounts::create))
        .route("/api/accounts/check/email/:email", get(accounts::check_email))
        .route(
            "/api/accounts/check/national-id/:national_id",
            get(accounts::check_national_id),
        )
        .route(
            "/api/accounts/:id",
            get(accounts::get).put(accounts::update).delete(accounts::delete),
        )
        // Field operations
        .route("/api/leaders", get(leaders::list).post(leaders::create))
        .route(
            "/api/leaders/:id",
            get(leaders::get).put(leaders::update).delete(leaders::delete),
        )
        .route("/api/voters", get(voters::list).post(voters::create))
        .route(
            "/api/voters/:id",
            get(voters::get).put(voters::update).delete(voters::delete),
        )
        .route("/api/visits", get(visits::list).post(visits::create))
        .route(
            "/api/visits/:id",
            get(visits::get).put(visits::update).delete(visits::delete),
        )
        .route("/api/help-records", get(help_records::list).post(help_records::create))
        .route(
            "/api/help-records/:id",
            get(help_records::get).put(help_records::update).delete(help_records::delete),
        )
        // Office agenda
        .route("/api/appointments", get(appointments::list).post(appointments::create))
        .route(
            "/api/appointments/:id",
            get(appointments::get).put(appointments::update).delete(appointments::delete),
        )
        // Legislative output
        .route("/api/law-projects", get(projects::list).post(projects::create))
        .route(
            "/api/law-projects/:id",
            get(projects::get).put(projects::update).delete(projects::delete),
        )
        .route("/api/law-projects/:id/view", post(projects::record_view))
        .route("/api/amendments", get(amendments::list).post(amendments::create))
        .route(
            "/api/amendments/:id",
            get(amendments::get).put(amendments::update).delete(amendments::delete),
        )
        // Audit trail
        .route("/api/audit", get(audit::list).delete(audit::clear))
        .route("/api/audit/entity/:kind", get(audit::list_by_entity))
        .route("/api/audit/action/:action", get(audit::list_by_action))
}

fn elevated_routes() -> Router {
    use crate::handlers::elevated::root;

    Router::new()
        .route("/api/root/tenants", get(root::tenant::tenant_list))
        .route("/api/root/orphans", get(root::orphan::orphan_stats))
        .route("/api/root/orphans/migrate/:tenant_id", post(root::orphan::orphan_migrate))
        .route("/api/root/accounts/:id/bind", post(root::account::account_bind))
}

fn cors_layer() -> CorsLayer {
    let security = &config::config().security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Mandate API",
            "version": version,
            "description": "Back-office API for political offices",
            "endpoints": {
                "home": "/ (public)",
                "login": "/auth/login (public - token acquisition)",
                "auth": "/api/auth/whoami (protected)",
                "accounts": "/api/accounts[/:id] (protected)",
                "leaders": "/api/leaders[/:id] (protected)",
                "voters": "/api/voters[/:id] (protected)",
                "visits": "/api/visits[/:id] (protected)",
                "help_records": "/api/help-records[/:id] (protected)",
                "appointments": "/api/appointments[/:id] (protected)",
                "law_projects": "/api/law-projects[/:id] (protected)",
                "amendments": "/api/amendments[/:id] (protected)",
                "audit": "/api/audit (protected)",
                "root": "/api/root/* (admin only)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
