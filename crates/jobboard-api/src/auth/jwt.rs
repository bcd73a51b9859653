//! Session token issuing and verification
//!
//! Tokens are HS256-signed JWTs carrying only the user id, issue time and
//! expiry. They are stateless: nothing is stored server side, so a token stays
//! valid until it expires.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// Token lifetime in seconds
pub const TOKEN_TTL_SECS: u64 = 3600;

/// Issuer claim stamped into and required on every token
pub const TOKEN_ISSUER: &str = "jobboard-api";

/// Claims embedded in a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Token issuer
    pub iss: String,
    /// Subject - user ID
    pub sub: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
}

/// Token issuing and verification errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),

    #[error("Invalid token format")]
    Malformed,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token signing secret is empty")]
    EmptySecret,

    #[error("System time error: {0}")]
    SystemTime(#[from] std::time::SystemTimeError),
}

/// Signs and verifies session tokens with a shared secret
///
/// Built once at startup from the configured secret and shared through the
/// application state.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs: TOKEN_TTL_SECS,
        })
    }

    /// Issue a token for `user_id` valid from now
    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        self.issue_at(user_id, now)
    }

    /// Issue a token as if signed at `issued_at` (Unix seconds)
    pub fn issue_at(&self, user_id: Uuid, issued_at: u64) -> Result<String, TokenError> {
        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: issued_at,
            exp: issued_at + self.ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Encoding)
    }

    /// Verify a token and return the user id it was issued for
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            }
        })?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Malformed)
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }
}

// Keys stay out of debug output
impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SECRET: &str = "test-secret-at-least-16-bytes";

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    #[test]
    fn test_issue_and_verify_token() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        let user_id = Uuid::new_v4();

        let token = issuer.issue(user_id).expect("Failed to issue token");
        assert_eq!(issuer.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(TokenIssuer::new(""), Err(TokenError::EmptySecret)));
    }

    #[test]
    fn test_malformed_token() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        assert!(matches!(
            issuer.verify("invalid.token.here"),
            Err(TokenError::Malformed)
        ));
        assert!(issuer.verify("").is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let signer = TokenIssuer::new("secret-number-one-0000").unwrap();
        let verifier = TokenIssuer::new("secret-number-two-0000").unwrap();

        let token = signer.issue(Uuid::new_v4()).unwrap();
        assert!(matches!(
            verifier.verify(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        // Signed two hours ago, expired one hour ago
        let token = issuer.issue_at(Uuid::new_v4(), now() - 7200).unwrap();

        assert!(matches!(issuer.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        let claims = Claims {
            iss: "someone-else".to_string(),
            sub: Uuid::new_v4().to_string(),
            iat: now(),
            exp: now() + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(issuer.verify(&token), Err(TokenError::Malformed)));
    }

    #[test]
    fn test_debug_hides_keys() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        assert!(!format!("{issuer:?}").contains(SECRET));
    }

    proptest! {
        #[test]
        fn tampered_token_never_verifies(bits in any::<u128>(), pos in 0usize..64) {
            let issuer = TokenIssuer::new(SECRET).unwrap();
            let token = issuer.issue(Uuid::from_u128(bits)).unwrap();

            let mut bytes = token.into_bytes();
            let idx = bytes.len() - 5 - (pos % 16);
            bytes[idx] = if bytes[idx] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();

            prop_assert!(issuer.verify(&tampered).is_err());
        }
    }
}
