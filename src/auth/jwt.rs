//! Bearer token issuance and verification
//!
//! Tokens are signed with a process-wide secret handed in at construction.
//! Rotating the secret invalidates every outstanding token; there is no grace
//! period.

use crate::config::AuthConfig;
use crate::utils::error::{GateError, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use uuid::Uuid;

/// JWT handler for token operations
#[derive(Clone)]
pub struct JwtHandler {
    /// Encoding key for signing tokens
    encoding_key: EncodingKey,
    /// Decoding key for verifying tokens
    decoding_key: DecodingKey,
    /// JWT algorithm
    algorithm: Algorithm,
    /// Token lifetime in seconds
    ttl_secs: u64,
}

impl std::fmt::Debug for JwtHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtHandler")
            .field("algorithm", &self.algorithm)
            .field("ttl_secs", &self.ttl_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

/// Identity claims carried by a bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (identity id)
    pub sub: Uuid,
    /// Role claim
    pub role_id: Uuid,
    /// Issued at timestamp
    pub iat: u64,
    /// Expiration timestamp
    pub exp: u64,
}

impl JwtHandler {
    /// Create a handler from explicit configuration
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            ttl_secs: config.token_ttl_secs,
        }
    }

    /// Issue a signed token carrying the two identity claims
    pub fn issue(&self, identity_id: Uuid, role_id: Uuid) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| GateError::internal(format!("system time error: {}", e)))?
            .as_secs();

        let claims = Claims {
            sub: identity_id,
            role_id,
            iat: now,
            exp: now + self.ttl_secs,
        };

        let header = Header::new(self.algorithm);
        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| GateError::Crypto(format!("failed to sign token: {}", e)))?;

        debug!("issued token for identity {}", identity_id);
        Ok(token)
    }

    /// Verify and decode a token.
    ///
    /// Malformed structure, bad signature, and expired timestamp all collapse
    /// into one `TokenInvalid` error so callers cannot tell which check failed.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                warn!("token verification failed: {}", e);
                GateError::TokenInvalid
            })?;

        debug!("verified token for identity {}", token_data.claims.sub);
        Ok(token_data.claims)
    }

    /// Configured token lifetime in seconds
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }
}
