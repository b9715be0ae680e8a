//! # Signed Bearer Tokens
//!
//! A self-contained HS256 token codec compatible with the common
//! `header.payload.signature` JWT wire shape. This is deliberately not a
//! full JWT library: the algorithm is fixed, the payload is an arbitrary
//! JSON object, and the only registered claim with semantics here is `exp`.
//!
//! ## Verification Order
//!
//! `decode` checks format, then decodes, then algorithm/type, then the
//! signature, then expiry. No claim is trusted for authorization before the
//! signature check passes, and the signature comparison is constant-time.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Token payload: an arbitrary JSON object map.
pub type Claims = serde_json::Map<String, Value>;

/// Reasons a token fails verification. `Expired` is deliberately distinct
/// from `Signature` so callers can tell a stale credential from a forged one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not three dot-separated segments.
    #[error("Invalid token format")]
    Format,

    /// A segment is not URL-safe base64, or header/payload is not JSON.
    #[error("Failed to decode token")]
    Malformed,

    /// Header does not declare `HS256`/`JWT`.
    #[error("Unsupported algorithm or type")]
    Algorithm,

    /// HMAC mismatch.
    #[error("Invalid signature")]
    Signature,

    /// The `exp` claim has passed.
    #[error("Token expired")]
    Expired,
}

/// Encode a claims map into a signed token.
///
/// An `exp` claim of `now + ttl_secs` is inserted (overwriting any caller
/// supplied value). Segments are URL-safe base64 without padding, signed
/// with HMAC-SHA256 over `header.payload`.
pub fn encode(claims: &Claims, secret: &[u8], ttl_secs: i64) -> String {
    let header = json!({"alg": "HS256", "typ": "JWT"});

    let mut payload = claims.clone();
    payload.insert("exp".to_string(), json!(Utc::now().timestamp() + ttl_secs));

    let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string());
    let payload_b64 = URL_SAFE_NO_PAD.encode(Value::Object(payload).to_string());

    let signature = sign(&format!("{header_b64}.{payload_b64}"), secret);
    let signature_b64 = URL_SAFE_NO_PAD.encode(signature);

    format!("{header_b64}.{payload_b64}.{signature_b64}")
}

/// Verify a token and return its claims.
///
/// # Errors
///
/// See [`TokenError`]; the variants map directly onto the verification
/// stages documented at module level.
pub fn decode(token: &str, secret: &[u8]) -> Result<Claims, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    let [header_b64, payload_b64, signature_b64] = parts.as_slice() else {
        return Err(TokenError::Format);
    };

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_b64)
        .map_err(|_| TokenError::Malformed)?;
    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| TokenError::Malformed)?;
    let provided_signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| TokenError::Malformed)?;

    let header: Value = serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
    let claims: Claims =
        serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::Malformed)?;

    if header["alg"] != "HS256" || header["typ"] != "JWT" {
        return Err(TokenError::Algorithm);
    }

    let expected = sign(&format!("{header_b64}.{payload_b64}"), secret);
    if expected.ct_eq(&provided_signature).unwrap_u8() == 0 {
        return Err(TokenError::Signature);
    }

    if let Some(exp) = claims.get("exp").and_then(Value::as_i64) {
        if exp < Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
    }

    Ok(claims)
}

fn sign(data: &str, secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(data.as_bytes());
    mac.finalize().into_bytes().to_vec()
}
