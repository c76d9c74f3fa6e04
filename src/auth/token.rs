// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token signing and verification.
//!
//! Tokens are HS256 JWTs carrying `{ user_id, iat }`, plus `exp` when a
//! lifetime is configured. Nothing about issued tokens is stored server-side.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::models::UserId;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Claims embedded in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: UserId,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp, absent when tokens never expire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Reasons a token can fail to be issued or verified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token payload is not a claims object")]
    UnexpectedPayload,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::InvalidSignature
            }
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => {
                TokenError::UnexpectedPayload
            }
            _ => TokenError::Malformed,
        }
    }
}

/// Signs and verifies session tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Option<Duration>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service.
    ///
    /// An empty secret is a configuration error; unsigned tokens are never issued.
    pub fn new(secret: &str, ttl: Option<Duration>) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_aud = false;
        if ttl.is_some() {
            validation.set_required_spec_claims(&["exp"]);
        } else {
            validation.set_required_spec_claims::<&str>(&[]);
            validation.validate_exp = false;
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    /// Issue a signed token for `user_id`.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let exp = match self.ttl {
            Some(ttl) => Some(
                i64::try_from(ttl.as_secs())
                    .ok()
                    .and_then(|secs| now.checked_add(secs))
                    .ok_or_else(|| {
                        TokenError::Signing(format!(
                            "token lifetime of {}s is out of range",
                            ttl.as_secs()
                        ))
                    })?,
            ),
            None => None,
        };
        let claims = SessionClaims {
            user_id,
            iat: now,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &self.validation)?;

        // With expiry validation off, a stray `exp` is still honoured.
        if self.ttl.is_none() {
            if let Some(exp) = data.claims.exp {
                if exp + (CLOCK_SKEW_LEEWAY as i64) < Utc::now().timestamp() {
                    return Err(TokenError::Expired);
                }
            }
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    fn service() -> TokenService {
        TokenService::new("test-secret", None).unwrap()
    }

    /// HMAC-sign an arbitrary JSON payload with `secret`.
    fn sign_raw_payload(payload: &serde_json::Value, secret: &str) -> String {
        use hmac::{Hmac, Mac};
        use sha2::Sha256;

        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        let message = format!("{header}.{body}");

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(message.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{message}.{signature}")
    }

    #[test]
    fn empty_secret_is_rejected() {
        let result = TokenService::new("", None);
        assert!(matches!(result, Err(ConfigError::MissingJwtSecret)));
    }

    #[test]
    fn issued_token_verifies_to_same_user() {
        let tokens = service();
        let token = tokens.issue(UserId(42)).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.user_id, UserId(42));
        assert_eq!(claims.exp, None);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let other = TokenService::new("other-secret", None).unwrap();
        let token = other.issue(UserId(1)).unwrap();
        assert_eq!(service().verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let tokens = service();
        let token = tokens.issue(UserId(1)).unwrap();

        let forged_body = URL_SAFE_NO_PAD.encode(r#"{"user_id":2,"iat":0}"#);
        let parts: Vec<&str> = token.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], forged_body, parts[2]);

        assert_eq!(tokens.verify(&tampered), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(service().verify("not-a-jwt"), Err(TokenError::Malformed));
    }

    #[test]
    fn unsigned_token_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(r#"{"user_id":1,"iat":0}"#);
        let token = format!("{header}.{body}.");
        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn string_payload_is_rejected() {
        let payload = serde_json::Value::String("user_id=1".to_string());
        let token = sign_raw_payload(&payload, "test-secret");
        assert_eq!(service().verify(&token), Err(TokenError::UnexpectedPayload));
    }

    #[test]
    fn ttl_adds_expiry_claim() {
        let tokens = TokenService::new("test-secret", Some(Duration::from_secs(3600))).unwrap();
        let token = tokens.issue(UserId(7)).unwrap();
        let claims = tokens.verify(&token).unwrap();
        let exp = claims.exp.expect("exp is set");
        assert_eq!(exp - claims.iat, 3600);
    }

    #[test]
    fn out_of_range_ttl_fails_to_issue() {
        for secs in [u64::MAX, i64::MAX as u64 - 10] {
            let tokens = TokenService::new("test-secret", Some(Duration::from_secs(secs))).unwrap();
            let result = tokens.issue(UserId(1));
            assert!(matches!(result, Err(TokenError::Signing(_))), "ttl {secs}");
        }
    }

    #[test]
    fn expired_token_is_rejected() {
        let payload = serde_json::json!({ "user_id": 1, "iat": 1000, "exp": 1060 });
        let token = sign_raw_payload(&payload, "test-secret");

        assert_eq!(service().verify(&token), Err(TokenError::Expired));

        let expiring = TokenService::new("test-secret", Some(Duration::from_secs(60))).unwrap();
        assert_eq!(expiring.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn ttl_service_rejects_tokens_without_expiry() {
        let token = service().issue(UserId(1)).unwrap();
        let expiring = TokenService::new("test-secret", Some(Duration::from_secs(60))).unwrap();
        assert_eq!(expiring.verify(&token), Err(TokenError::UnexpectedPayload));
    }
}
