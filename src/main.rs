use mandate_api::config;
use mandate_api::database::manager::DatabaseManager;
use mandate_api::database::schema;
use mandate_api::routes::app;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Mandate API in {:?} mode", config.environment);

    // Schema and seed admin before accepting traffic. A missing database is
    // not fatal here, /health reports it as degraded until it comes back.
    match DatabaseManager::pool().await {
        Ok(pool) => {
            if let Err(e) = schema::init_schema(&pool).await {
                tracing::error!("Schema initialization failed: {}", e);
            }
            if let Err(e) = schema::ensure_bootstrap_admin(&pool).await {
                tracing::error!("Bootstrap admin seed failed: {}", e);
            }
        }
        Err(e) => tracing::warn!("Database not reachable at startup: {}", e),
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("MANDATE_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Mandate API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
