//! Bearer token issuing and verification.
//!
//! Tokens are `base64url(claims-json) + "." + hex(hmac-sha256(claims))`,
//! signed with the configured secret and valid for 24 hours. Verification
//! recomputes the MAC over the exact encoded claims and uses a
//! constant-time comparison.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use stitchpress_core::{UserId, UserRole};

use crate::models::User;

/// Token lifetime in seconds.
const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Errors from token verification.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("signature mismatch")]
    BadSignature,

    #[error("token expired")]
    Expired,
}

/// The signed claims carried by a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,
    pub email: String,
    pub role: UserRole,
    /// Unix expiry timestamp.
    pub exp: i64,
}

/// Issues and verifies signed bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    secret: SecretString,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl TokenService {
    #[must_use]
    pub const fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Issue a 24-hour token for `user`.
    #[must_use]
    pub fn issue(&self, user: &User) -> String {
        let claims = Claims {
            user_id: user.id,
            email: user.email.as_str().to_owned(),
            role: user.role,
            exp: Utc::now().timestamp() + TOKEN_TTL_SECS,
        };
        self.issue_claims(&claims)
    }

    fn issue_claims(&self, claims: &Claims) -> String {
        // Claims are a plain struct of serializable fields; encoding them
        // cannot fail.
        let payload = serde_json::to_vec(claims).unwrap_or_default();
        let encoded = URL_SAFE_NO_PAD.encode(&payload);
        let signature = hex::encode(self.mac_over(encoded.as_bytes()));
        format!("{encoded}.{signature}")
    }

    /// Verify a presented token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`] for anything not in the two-part
    /// format, [`TokenError::BadSignature`] when the MAC does not match,
    /// and [`TokenError::Expired`] past the expiry timestamp.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let (encoded, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let signature = hex::decode(signature).map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac();
        mac.update(encoded.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn mac(&self) -> Hmac<Sha256> {
        // A SHA-256 HMAC accepts keys of any length.
        #[allow(clippy::expect_used)]
        Hmac::<Sha256>::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("hmac accepts any key length")
    }

    fn mac_over(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use stitchpress_core::Email;

    fn service(secret: &str) -> TokenService {
        TokenService::new(SecretString::from(secret.to_owned()))
    }

    fn sample_user() -> User {
        User {
            id: UserId::new(7),
            email: Email::parse("tess@example.com").expect("valid email"),
            password_hash: "hash".to_owned(),
            name: "Tess".to_owned(),
            role: UserRole::Admin,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let svc = service("a-perfectly-reasonable-test-secret");
        let token = svc.issue(&sample_user());
        let claims = svc.verify(&token).expect("verify");
        assert_eq!(claims.user_id, UserId::new(7));
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.email, "tess@example.com");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service("secret-one").issue(&sample_user());
        assert!(matches!(
            service("secret-two").verify(&token),
            Err(TokenError::BadSignature)
        ));
    }

    #[test]
    fn test_tampered_claims_rejected() {
        let svc = service("a-perfectly-reasonable-test-secret");
        let token = svc.issue(&sample_user());
        let (payload, sig) = token.split_once('.').expect("two parts");

        let mut claims: Claims = serde_json::from_slice(
            &URL_SAFE_NO_PAD.decode(payload).expect("decode"),
        )
        .expect("claims");
        claims.role = UserRole::Admin;
        claims.user_id = UserId::new(1);
        let forged = format!(
            "{}.{sig}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).expect("encode"))
        );
        assert!(svc.verify(&forged).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = service("a-perfectly-reasonable-test-secret");
        let claims = Claims {
            user_id: UserId::new(7),
            email: "tess@example.com".to_owned(),
            role: UserRole::User,
            exp: Utc::now().timestamp() - 1,
        };
        let token = svc.issue_claims(&claims);
        assert!(matches!(svc.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let svc = service("a-perfectly-reasonable-test-secret");
        for junk in ["", "no-dot", "a.b", "a.zzzz"] {
            assert!(svc.verify(junk).is_err(), "{junk:?} must fail");
        }
    }
}
