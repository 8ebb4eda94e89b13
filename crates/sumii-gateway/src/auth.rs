//! Bearer-token verification. Registration/login/refresh are handled
//! elsewhere; this gateway only validates a token already issued and maps
//! `sub` to a user id.
//!
//! HS256 JWT, verified by hand with the `hmac`/`sha2` crates
//! rather than pulling in a dedicated JWT crate, since verification (no
//! issuance, no key rotation) is all this boundary needs.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("malformed bearer token")]
    Malformed,
    #[error("invalid token signature")]
    BadSignature,
    #[error("unsupported token algorithm")]
    UnsupportedAlg,
}

/// Verifies `token`'s HS256 signature against `secret` and returns the
/// subject (user id) claim. Does not check `exp`/`nbf` — token lifetime
/// policy lives with the issuing boundary service, not here.
pub fn verify_bearer_token(token: &str, secret: &str) -> Result<String, AuthError> {
    let mut parts = token.split('.');
    let (header_b64, payload_b64, sig_b64) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(p), Some(s), None) => (h, p, s),
        _ => return Err(AuthError::Malformed),
    };

    let header_json = URL_SAFE_NO_PAD.decode(header_b64).map_err(|_| AuthError::Malformed)?;
    let header: serde_json::Value = serde_json::from_slice(&header_json).map_err(|_| AuthError::Malformed)?;
    if header.get("alg").and_then(|a| a.as_str()) != Some("HS256") {
        return Err(AuthError::UnsupportedAlg);
    }

    let expected_sig = URL_SAFE_NO_PAD.decode(sig_b64).map_err(|_| AuthError::Malformed)?;
    let signing_input = format!("{header_b64}.{payload_b64}");
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| AuthError::BadSignature)?;
    mac.update(signing_input.as_bytes());
    mac.verify_slice(&expected_sig).map_err(|_| AuthError::BadSignature)?;

    let payload_json = URL_SAFE_NO_PAD.decode(payload_b64).map_err(|_| AuthError::Malformed)?;
    let claims: Claims = serde_json::from_slice(&payload_json).map_err(|_| AuthError::Malformed)?;
    Ok(claims.sub)
}

/// Extracts and verifies the `Authorization: Bearer <jwt>` header, returning
/// the subject (user id) claim. Used by every bearer-authenticated REST
/// handler.
pub fn require_user(headers: &axum::http::HeaderMap, jwt_secret: &str) -> Result<String, crate::respond::ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| sumii_core::SumiiError::AuthFailed("missing Authorization header".into()))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| sumii_core::SumiiError::AuthFailed("expected Bearer token".into()))?;
    verify_bearer_token(token, jwt_secret).map_err(|e| sumii_core::SumiiError::AuthFailed(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(payload.to_string());
        let signing_input = format!("{header}.{payload}");
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signing_input.as_bytes());
        let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{signing_input}.{sig}")
    }

    #[test]
    fn valid_token_yields_subject() {
        let token = sign("secret", &serde_json::json!({"sub": "user-1"}));
        assert_eq!(verify_bearer_token(&token, "secret").unwrap(), "user-1");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign("secret", &serde_json::json!({"sub": "user-1"}));
        assert!(verify_bearer_token(&token, "other").is_err());
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert!(verify_bearer_token("not-a-jwt", "secret").is_err());
    }
}
