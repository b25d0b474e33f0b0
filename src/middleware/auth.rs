use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::auth::Claims;
use crate::authz::Principal;
use crate::config;
use crate::error::ApiError;

/// JWT authentication middleware that validates tokens and injects the
/// resolved [`Principal`] into request extensions.
pub async fn principal_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, impl IntoResponse> {
    // Extract JWT from Authorization header
    let token = extract_jwt_from_headers(&headers).map_err(unauthorized_response)?;

    // Validate and decode JWT
    let claims = validate_jwt(&token).map_err(unauthorized_response)?;

    let principal = claims.principal();
    request.extensions_mut().insert(principal);

    Ok::<Response, (StatusCode, Json<serde_json::Value>)>(next.run(request).await)
}

fn unauthorized_response(msg: String) -> (StatusCode, Json<serde_json::Value>) {
    let api_error = ApiError::unauthorized(msg);
    (
        StatusCode::from_u16(api_error.status_code()).unwrap_or(StatusCode::UNAUTHORIZED),
        Json(api_error.to_json()),
    )
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

/// Validate JWT token and extract claims
fn validate_jwt(token: &str) -> Result<Claims, String> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Invalid JWT token: {}", e))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::generate_jwt;
    use crate::authz::Role;
    use uuid::Uuid;

    #[test]
    fn bearer_extraction_rules() {
        let mut headers = HeaderMap::new();
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", "Token abc".parse().unwrap());
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", "Bearer ".parse().unwrap());
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(extract_jwt_from_headers(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn issued_tokens_validate_back_to_a_principal() {
        let principal = Principal {
            account_id: Uuid::new_v4(),
            name: "Holder".to_string(),
            email: "holder@example.com".to_string(),
            role: Role::OfficeHolder,
            effective_tenant_id: Some(Uuid::new_v4()),
        };
        let token = generate_jwt(Claims::for_principal(&principal)).unwrap();
        let claims = validate_jwt(&token).unwrap();
        assert_eq!(claims.sub, principal.account_id);
        assert_eq!(claims.role, Role::OfficeHolder);
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let principal = Principal {
            account_id: Uuid::new_v4(),
            name: "Aide".to_string(),
            email: "aide@example.com".to_string(),
            role: Role::Aide,
            effective_tenant_id: Some(Uuid::new_v4()),
        };
        let token = generate_jwt(Claims::for_principal(&principal)).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(validate_jwt(&tampered).is_err());
    }
}
