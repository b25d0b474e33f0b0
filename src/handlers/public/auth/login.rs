// handlers/public/auth/login.rs - POST /auth/login handler

use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::authz::resolve_principal;
use crate::config::config;
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::account_service;
use crate::services::audit_service::{self, NewAuditEntry};
use crate::types::{AuditAction, EntityKind};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Account fields safe to hand back at login. `tenant_id` here is the
/// resolved effective tenant, not the stored column.
#[derive(Debug, Serialize)]
pub struct LoginAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub region: Option<String>,
    pub active: bool,
    pub tenant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub account: LoginAccount,
    pub expires_in: i64,
}

/// POST /auth/login - authenticate and receive a JWT
///
/// The effective tenant is resolved here, once, and embedded in the token;
/// nothing downstream recomputes it.
pub async fn login_post(Json(payload): Json<LoginRequest>) -> ApiResult<LoginResponse> {
    let pool = DatabaseManager::pool().await?;

    let account = account_service::find_by_email(&pool, payload.email.trim())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let password_ok =
        bcrypt::verify(&payload.password, &account.password_hash).unwrap_or(false);
    if !password_ok {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let principal = resolve_principal(&account)?;

    let claims = Claims::for_principal(&principal);
    let token = generate_jwt(claims).map_err(|e| {
        tracing::error!("JWT generation failed: {}", e);
        ApiError::internal_server_error("Could not issue a token")
    })?;

    audit_service::record(
        &pool,
        NewAuditEntry::new(
            AuditAction::Login,
            EntityKind::Account,
            format!("Login: {}", account.email),
        )
        .entity(account.id)
        .by(&principal),
    )
    .await;

    let expires_in = config().security.jwt_expiry_hours as i64 * 3600;
    Ok(ApiResponse::success(LoginResponse {
        token,
        account: LoginAccount {
            id: account.id,
            name: account.name,
            email: account.email,
            national_id: account.national_id,
            phone: account.phone,
            role: account.role,
            region: account.region,
            active: account.active,
            tenant_id: principal.effective_tenant_id,
            created_at: account.created_at,
        },
        expires_in,
    }))
}
