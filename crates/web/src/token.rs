//! Signed bearer tokens.
//!
//! Format: `base64url(json claims) "." base64url(hmac_sha256(payload))`.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use storage::models::{Role, User};
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("invalid signing key")]
    InvalidKey,
}

#[derive(Clone)]
pub struct TokenSigner {
    mac: HmacSha256,
    ttl: Duration,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, TokenError> {
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| TokenError::InvalidKey)?;
        Ok(Self { mac, ttl })
    }

    pub fn issue(&self, user: &User, now: DateTime<Utc>) -> String {
        let claims = Claims {
            sub: user.user_id,
            role: user.role,
            exp: (now + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> String {
        let json = serde_json::to_vec(claims).unwrap_or_default();
        let payload = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{payload}.{signature}")
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&json).map_err(|_| TokenError::Malformed)?;

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(b"0123456789abcdef0123456789abcdef", Duration::hours(24)).unwrap()
    }

    fn claims(exp: DateTime<Utc>) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            role: Role::Volunteer,
            exp: exp.timestamp(),
        }
    }

    #[test]
    fn signed_token_verifies_until_expiry() {
        let now = Utc::now();
        let claims = claims(now + Duration::hours(1));
        let token = signer().sign(&claims);

        assert_eq!(signer().verify(&token, now).unwrap(), claims);
        assert_eq!(
            signer().verify(&token, now + Duration::hours(2)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let now = Utc::now();
        let token = signer().sign(&claims(now + Duration::hours(1)));
        let (_, signature) = token.split_once('.').unwrap();

        let mut forged = claims(now + Duration::hours(1));
        forged.role = Role::Administrator;
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());

        assert_eq!(
            signer().verify(&format!("{forged_payload}.{signature}"), now),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn other_secret_is_rejected() {
        let now = Utc::now();
        let token = signer().sign(&claims(now + Duration::hours(1)));
        let other = TokenSigner::new(b"another-secret-entirely", Duration::hours(1)).unwrap();
        assert_eq!(other.verify(&token, now), Err(TokenError::BadSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(
            signer().verify("not-a-token", Utc::now()),
            Err(TokenError::Malformed)
        );
    }
}
