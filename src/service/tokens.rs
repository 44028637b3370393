use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::PortalError;
use crate::types::users::TokenPair;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub token_type: TokenType,
    pub user_id: i64,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 signer for short-lived access tokens and longer refresh tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(cfg: &AuthConfig) -> Self {
        let secret = cfg.secret_key.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            access_ttl: Duration::seconds(cfg.access_ttl_secs),
            refresh_ttl: Duration::seconds(cfg.refresh_ttl_secs),
        }
    }

    pub fn issue_pair(&self, user_id: i64) -> Result<TokenPair, PortalError> {
        Ok(TokenPair {
            access: self.issue(user_id, TokenType::Access)?,
            refresh: self.issue(user_id, TokenType::Refresh)?,
        })
    }

    pub fn issue(&self, user_id: i64, token_type: TokenType) -> Result<String, PortalError> {
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let now = Utc::now();
        let claims = TokenClaims {
            token_type,
            user_id,
            jti: Uuid::new_v4().simple().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| PortalError::Internal(format!("token encoding failed: {e}")))
    }

    /// Check signature, expiry and that the token is of the `expected` kind.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<TokenClaims, PortalError> {
        let data = decode::<TokenClaims>(token, &self.decoding, &self.validation)?;
        if data.claims.token_type != expected {
            return Err(PortalError::Unauthorized(
                "Token has wrong type".to_string(),
            ));
        }
        Ok(data.claims)
    }
}
