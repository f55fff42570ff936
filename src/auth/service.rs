//! Account registration, credential checks and bearer resolution.

use std::sync::Arc;

use crate::auth::passwords::{hash_password, verify_password};
use crate::auth::tokens::TokenSigner;
use crate::domain::dto::{Credentials, TokenResponse};
use crate::domain::models::{Role, User};
use crate::http::error::ApiError;
use crate::store::{MemoryStore, StoreError};

pub struct AuthService {
    store: Arc<MemoryStore>,
    signer: TokenSigner,
}

impl AuthService {
    pub fn new(store: Arc<MemoryStore>, signer: TokenSigner) -> Self {
        Self { store, signer }
    }

    pub fn register(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let password_hash = hash_password(&credentials.password);
        self.store
            .insert_user(&credentials.email, password_hash, Role::User)
            .map_err(|err| match err {
                StoreError::DuplicateEmail => ApiError::UserAlreadyExists,
                other => ApiError::Internal(other.to_string()),
            })
    }

    /// Check a credential pair. The same error is returned for an unknown
    /// email and a wrong password.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let email = email.trim().to_ascii_lowercase();
        let user = self
            .store
            .user_by_email(&email)
            .ok_or(ApiError::InvalidCredentials)?;
        if !verify_password(password, &user.password_hash) {
            return Err(ApiError::InvalidCredentials);
        }
        Ok(user)
    }

    pub fn issue_token(&self, user: &User) -> Result<TokenResponse, ApiError> {
        let token = self
            .signer
            .issue(user)
            .map_err(|err| ApiError::Internal(err.to_string()))?;
        Ok(TokenResponse::bearer(token))
    }

    /// Resolve a bearer token to an active user.
    pub fn resolve_bearer(&self, token: &str) -> Result<User, ApiError> {
        let rejected = || ApiError::Unauthorized("Could not validate credentials".to_string());

        let claims = self.signer.verify(token).map_err(|err| {
            tracing::debug!(error = %err, "Bearer token rejected");
            rejected()
        })?;
        let user_id: i64 = claims.sub.parse().map_err(|_| rejected())?;
        let user = self.store.user_by_id(user_id).ok_or_else(rejected)?;
        if !user.is_active {
            return Err(rejected());
        }
        Ok(user)
    }
}
