//! Token issuing, verification and rule evaluation.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::services::user::UserRole;
use crate::services::ServiceError;

mod rule;

pub use rule::Rule;

/// Caller identity carried in the bearer token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub roles: Vec<UserRole>,
}

impl Claims {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("expected authorization header format: Bearer <token>")]
    MissingHeader,

    #[error("invalid authorization header: {0}")]
    InvalidHeader(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("user disabled")]
    UserDisabled,

    #[error("you are not authorized for that action, claims[{roles:?}] rule[{rule}]")]
    Forbidden { roles: Vec<UserRole>, rule: Rule },

    #[error("jwt secret not configured")]
    MissingSecret,

    #[error("signing token: {0}")]
    Signing(String),

    #[error("user lookup: {0}")]
    Lookup(#[source] ServiceError),
}

/// Issues and verifies HS256 tokens for one issuer
pub struct Auth {
    issuer: String,
    expiry: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Auth {
    pub fn new(cfg: &SecurityConfig) -> Result<Self, AuthError> {
        if cfg.jwt_secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[cfg.jwt_issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Ok(Self {
            issuer: cfg.jwt_issuer.clone(),
            expiry: Duration::hours(cfg.jwt_expiry_hours as i64),
            encoding_key: EncodingKey::from_secret(cfg.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(cfg.jwt_secret.as_bytes()),
            validation,
        })
    }

    /// Build claims for a user, stamped with this issuer and expiry
    pub fn claims_for(&self, user_id: Uuid, roles: Vec<UserRole>) -> Claims {
        let now = Utc::now();
        Claims {
            sub: user_id,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.expiry).timestamp(),
            roles,
        }
    }

    pub fn generate_token(&self, kid: &str, claims: &Claims) -> Result<String, AuthError> {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(kid.to_string());

        encode(&header, claims, &self.encoding_key).map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify a raw `Authorization` header value and return its claims
    pub fn authenticate(&self, bearer: &str) -> Result<Claims, AuthError> {
        let token = bearer
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingHeader)?;

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(data.claims)
    }

    /// Evaluate `rule` for the caller against the owner of the resource, if any
    pub fn authorize(&self, claims: &Claims, owner: Option<Uuid>, rule: Rule) -> Result<(), AuthError> {
        if rule.evaluate(claims, owner) {
            return Ok(());
        }

        Err(AuthError::Forbidden {
            roles: claims.roles.clone(),
            rule,
        })
    }
}
