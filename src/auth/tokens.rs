//! Bearer token issuance and verification (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecretValue;
use crate::domain::models::{Role, User};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id, stringified.
    pub sub: String,
    pub role: Role,
    /// Expiry as a Unix timestamp.
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signing failed")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("token rejected")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Signs and verifies access tokens with the process-lifetime JWT secret.
#[derive(Debug, Clone)]
pub struct TokenSigner {
    secret: SecretValue,
    ttl_minutes: i64,
}

impl TokenSigner {
    pub fn new(secret: SecretValue, ttl_minutes: i64) -> Self {
        Self {
            secret,
            ttl_minutes,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            exp: (Utc::now() + Duration::minutes(self.ttl_minutes)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.expose().as_bytes()),
        )
        .map_err(TokenError::Sign)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.expose().as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(TokenError::Invalid)
    }
}
