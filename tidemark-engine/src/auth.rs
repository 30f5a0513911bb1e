//! Auth service - credential hashing and bearer tokens
//!
//! Registration and login over the user store. Passwords are hashed with
//! Argon2id; logins are answered with an HS256 bearer token carrying an
//! expiry. Wallet secrets never pass through here.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::error::EscrowError;
use crate::models::{User, UserProfile};
use crate::store::UserStore;
use crate::EscrowResult;

/// Configuration for the auth service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// HMAC secret for bearer tokens
    pub token_secret: String,
    /// Token lifetime in seconds
    pub token_ttl_secs: i64,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            token_ttl_secs: 3600, // 1 hour
        }
    }
}

/// Bearer token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to
    pub sub: String,
    /// Expiry as unix seconds
    pub exp: usize,
}

/// Registration and login over a user store
pub struct AuthService {
    config: AuthServiceConfig,
    users: Arc<dyn UserStore>,
}

impl AuthService {
    /// Create the service; the token secret must be configured
    pub fn new(config: AuthServiceConfig, users: Arc<dyn UserStore>) -> EscrowResult<Self> {
        if config.token_secret.trim().is_empty() {
            return Err(EscrowError::config("Token secret must not be empty"));
        }
        Ok(Self { config, users })
    }

    /// Register a new user with a hashed credential
    pub async fn register(&self, username: &str, password: &str) -> EscrowResult<UserProfile> {
        if username.trim().is_empty() {
            return Err(EscrowError::MissingField("username"));
        }
        if password.is_empty() {
            return Err(EscrowError::MissingField("password"));
        }

        let password_hash = hash_password(password)?;
        let user = self
            .users
            .insert(User::new(username.to_string(), password_hash))
            .await?;

        info!(username = %user.username, "Registered user");

        Ok(user.profile())
    }

    /// Verify credentials and issue a bearer token.
    ///
    /// Unknown usernames and wrong passwords fail the same way, so a caller
    /// cannot probe which usernames exist.
    pub async fn login(&self, username: &str, password: &str) -> EscrowResult<String> {
        let user = match self.users.get(username).await {
            Ok(user) => user,
            Err(EscrowError::UserNotFound(_)) => return Err(EscrowError::InvalidCredentials),
            Err(e) => return Err(e),
        };

        if !verify_password(password, &user.password_hash)? {
            return Err(EscrowError::InvalidCredentials);
        }

        let claims = Claims {
            sub: user.username.clone(),
            exp: (Utc::now().timestamp() + self.config.token_ttl_secs) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.token_secret.as_bytes()),
        )
        .map_err(|e| EscrowError::auth(e.to_string()))?;

        info!(username = %user.username, "Issued bearer token");

        Ok(token)
    }

    /// Decode and validate a bearer token
    pub fn verify_token(&self, token: &str) -> EscrowResult<Claims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.token_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| EscrowError::auth(e.to_string()))?;
        Ok(data.claims)
    }
}

/// Hash a password with Argon2id and a fresh salt
pub fn hash_password(password: &str) -> EscrowResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| EscrowError::auth(e.to_string()))
}

/// Check a password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> EscrowResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| EscrowError::auth(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
