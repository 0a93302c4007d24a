//! Session tokens and the admin password check.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, PasswordHash};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::{Role, User};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "app_session_id";

/// Login method recorded for password sign-ins.
pub const PASSWORD_LOGIN_METHOD: &str = "password";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password login is not configured")]
    PasswordLoginDisabled,

    #[error("invalid password hash: {0}")]
    InvalidHash(String),

    #[error("invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// The user's `openId`.
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 signing and verification keys plus the session lifetime.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a session token for `user`.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user.open_id.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Check signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

/// The admin password, held only as an argon2 PHC string.
#[derive(Debug, Clone)]
pub struct AdminPassword {
    hash: String,
}

impl AdminPassword {
    /// Accept a PHC string such as the output of `hash-password`.
    pub fn from_hash(hash: impl Into<String>) -> Result<Self, AuthError> {
        let hash = hash.into();
        PasswordHash::new(&hash).map_err(|e| AuthError::InvalidHash(e.to_string()))?;
        Ok(Self { hash })
    }

    pub fn verify(&self, password: &str) -> Result<(), AuthError> {
        let parsed = PasswordHash::new(&self.hash).map_err(|e| AuthError::InvalidHash(e.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AuthError::InvalidCredentials)
    }
}

/// Hash `password` with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::InvalidHash(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        let now = Utc::now();
        User {
            id: 1,
            open_id: "owner".to_string(),
            name: None,
            email: None,
            login_method: Some(PASSWORD_LOGIN_METHOD.to_string()),
            role,
            created_at: now,
            updated_at: now,
            last_signed_in: now,
        }
    }

    #[test]
    fn issued_token_verifies() {
        let keys = SessionKeys::new(b"test-secret", Duration::hours(24));
        let token = keys.issue(&user(Role::Admin)).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, "owner");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let issuer = SessionKeys::new(b"one", Duration::hours(1));
        let verifier = SessionKeys::new(b"two", Duration::hours(1));
        let token = issuer.issue(&user(Role::User)).unwrap();
        assert!(matches!(verifier.verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = SessionKeys::new(b"secret", Duration::hours(-2));
        let token = keys.issue(&user(Role::Admin)).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn password_round_trip() {
        let hash = hash_password("s3nha").unwrap();
        let admin = AdminPassword::from_hash(hash).unwrap();
        assert!(admin.verify("s3nha").is_ok());
        assert!(matches!(admin.verify("S3nha"), Err(AuthError::InvalidCredentials)));
        assert!(matches!(admin.verify(""), Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn malformed_hash_is_refused() {
        assert!(matches!(
            AdminPassword::from_hash("plaintext"),
            Err(AuthError::InvalidHash(_))
        ));
    }
}
