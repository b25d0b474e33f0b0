use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authz::{Principal, Role};
use crate::config;

/// Session token payload. Carries the whole resolved principal so request
/// handling never needs an account lookup.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub tenant_id: Option<Uuid>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn for_principal(principal: &Principal) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: principal.account_id,
            name: principal.name.clone(),
            email: principal.email.clone(),
            role: principal.role,
            tenant_id: principal.effective_tenant_id,
            exp,
            iat: now.timestamp(),
        }
    }

    pub fn principal(&self) -> Principal {
        Principal {
            account_id: self.sub,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            effective_tenant_id: self.tenant_id,
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: Claims) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, &claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_round_trip_the_principal() {
        let tenant = Uuid::new_v4();
        let principal = Principal {
            account_id: Uuid::new_v4(),
            name: "Aide".to_string(),
            email: "aide@example.com".to_string(),
            role: Role::Aide,
            effective_tenant_id: Some(tenant),
        };

        let claims = Claims::for_principal(&principal);
        assert!(claims.exp > claims.iat);

        let restored = claims.principal();
        assert_eq!(restored.account_id, principal.account_id);
        assert_eq!(restored.role, Role::Aide);
        assert_eq!(restored.effective_tenant_id, Some(tenant));
    }
}
