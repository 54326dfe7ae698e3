// =============================================================================
// Session Tokens — HMAC-SHA256 signed, stateless
// =============================================================================
//
// A login issues `hex(email).issued_at.hex(sig)` where
// `sig = HMAC-SHA256(secret, "email.issued_at")`. The server keeps no session
// table; validity is the signature plus a max age. Signature comparison is
// performed in constant time to prevent timing side-channels.
//
// Usage as an Axum extractor:
//
//   async fn handler(SessionAuth(email): SessionAuth, ...) { ... }
//
// If the token is missing, malformed, expired, or forged, the extractor
// short-circuits the request with a 401 response before the handler body
// executes.
// =============================================================================

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

use crate::app_state::AppState;

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Constant-time comparison
// =============================================================================

/// Compare two byte slices in constant time. The comparison always examines
/// every byte of both slices even when a mismatch is found early.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

// =============================================================================
// Keys
// =============================================================================

/// Signing secret and token lifetime, held in `AppState`.
#[derive(Clone)]
pub struct SessionKeys {
    secret: Vec<u8>,
    max_age_secs: i64,
}

impl SessionKeys {
    pub fn new(secret: impl Into<Vec<u8>>, max_age_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            max_age_secs,
        }
    }

    fn sign(&self, email: &str, issued_at: i64) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key size");
        mac.update(format!("{email}.{issued_at}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Issue a token for `email` at time `now` (UNIX seconds).
    pub fn issue(&self, email: &str, now: i64) -> String {
        let sig = self.sign(email, now);
        format!("{}.{}.{}", hex::encode(email.as_bytes()), now, sig)
    }

    /// Verify a token at time `now`; returns the embedded email when the
    /// signature matches and the token has not expired.
    pub fn verify(&self, token: &str, now: i64) -> Option<String> {
        let mut parts = token.splitn(3, '.');
        let email_hex = parts.next()?;
        let issued_at: i64 = parts.next()?.parse().ok()?;
        let sig = parts.next()?;

        let email = String::from_utf8(hex::decode(email_hex).ok()?).ok()?;
        let expected = self.sign(&email, issued_at);
        if !constant_time_eq(sig.as_bytes(), expected.as_bytes()) {
            return None;
        }
        if now < issued_at || now - issued_at > self.max_age_secs {
            return None;
        }
        Some(email)
    }
}

// =============================================================================
// Extractor
// =============================================================================

/// Axum extractor that validates the `Authorization: Bearer <token>` header
/// against the server's session keys and yields the authenticated email.
pub struct SessionAuth(pub String);

/// Rejection returned when authentication fails.
pub struct AuthRejection {
    status: StatusCode,
    message: &'static str,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
        });
        (self.status, axum::Json(body)).into_response()
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for SessionAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = match auth_header {
            Some(value) if value.starts_with("Bearer ") => &value[7..],
            _ => {
                warn!("Missing or malformed Authorization header");
                return Err(AuthRejection {
                    status: StatusCode::UNAUTHORIZED,
                    message: "Missing or invalid session token",
                });
            }
        };

        match state.session_keys.verify(token, chrono::Utc::now().timestamp()) {
            Some(email) => Ok(SessionAuth(email)),
            None => {
                warn!("Invalid or expired session token presented");
                Err(AuthRejection {
                    status: StatusCode::UNAUTHORIZED,
                    message: "Invalid or expired session token",
                })
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new(b"test-secret".to_vec(), 3600)
    }

    #[test]
    fn constant_time_eq_basics() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"short", b"longer_string"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn issue_verify_round_trip() {
        let keys = keys();
        let token = keys.issue("a@b.com", 1_000);
        assert_eq!(keys.verify(&token, 1_010).as_deref(), Some("a@b.com"));
    }

    #[test]
    fn expired_token_rejected() {
        let keys = keys();
        let token = keys.issue("a@b.com", 1_000);
        assert!(keys.verify(&token, 1_000 + 3_601).is_none());
    }

    #[test]
    fn token_from_the_future_rejected() {
        let keys = keys();
        let token = keys.issue("a@b.com", 2_000);
        assert!(keys.verify(&token, 1_000).is_none());
    }

    #[test]
    fn tampered_token_rejected() {
        let keys = keys();
        let token = keys.issue("a@b.com", 1_000);
        // Swap the embedded email for another one, keeping the signature.
        let mut parts: Vec<&str> = token.splitn(3, '.').collect();
        let other = hex::encode("evil@b.com".as_bytes());
        parts[0] = &other;
        let forged = parts.join(".");
        assert!(keys.verify(&forged, 1_010).is_none());
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = keys().issue("a@b.com", 1_000);
        let other = SessionKeys::new(b"other-secret".to_vec(), 3600);
        assert!(other.verify(&token, 1_010).is_none());
    }

    #[test]
    fn garbage_token_rejected() {
        assert!(keys().verify("definitely-not-a-token", 0).is_none());
        assert!(keys().verify("", 0).is_none());
        assert!(keys().verify("zz.abc.def", 0).is_none());
    }

    #[test]
    fn email_with_dots_survives_round_trip() {
        let keys = keys();
        let token = keys.issue("first.last@mail.example.org", 1_000);
        assert_eq!(
            keys.verify(&token, 1_001).as_deref(),
            Some("first.last@mail.example.org")
        );
    }
}
