//! JWT (JSON Web Token) utilities for authentication.
//!
//! Tokens are issued by the account service and validated here; the messaging
//! core only needs the subject claim to bind an identity to a connection.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::UserError;

const ISSUER: &str = "cadence";

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user's public id
    pub sub: String,
    /// Expiration time (unix seconds)
    pub exp: i64,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

/// JWT token manager
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_duration: Duration,
}

impl JwtManager {
    /// Create a new JWT manager
    pub fn new(secret: &str, token_duration: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            token_duration,
        }
    }

    /// Generate a signed token for a user public id
    pub fn generate_token(&self, user_public_id: &str) -> Result<String, UserError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_public_id.to_string(),
            exp: now + self.token_duration.as_secs() as i64,
            iat: now,
            iss: ISSUER.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| UserError::TokenCreationFailed(e.to_string()))
    }

    /// Validate a signed token and return its claims.
    ///
    /// Expired tokens map to a distinct error so callers can tell a retryable
    /// authentication failure apart from a malformed token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, UserError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[ISSUER]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => UserError::TokenExpired,
                _ => UserError::InvalidToken(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(ttl_secs: u64) -> JwtManager {
        JwtManager::new("test-secret", Duration::from_secs(ttl_secs))
    }

    #[test]
    fn token_round_trip() {
        let jwt = manager(3600);
        let token = jwt.generate_token("user_abc").unwrap();
        let claims = jwt.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "user_abc");
        assert_eq!(claims.iss, ISSUER);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let jwt = manager(3600);
        let other = JwtManager::new("different-secret", Duration::from_secs(3600));

        let token = other.generate_token("user_abc").unwrap();
        let err = jwt.validate_token(&token).unwrap_err();
        assert!(matches!(err, UserError::InvalidToken(_)));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let jwt = manager(3600);
        let err = jwt.validate_token("not-a-token").unwrap_err();
        assert!(matches!(err, UserError::InvalidToken(_)));
    }
}
