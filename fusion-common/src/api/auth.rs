//! Bearer token signing and verification
//!
//! Tokens are compact JWS values (HS256) carrying [`AuthClaims`]. The signing
//! key is the service's shared secret.
//!
//! # Pure Functions
//!
//! This module contains ONLY pure functions. Header extraction and the
//! access-denied response live in the service crate's middleware.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// `iss` claim stamped on every token this service issues
pub const TOKEN_ISSUER: &str = "fusion-api";

const JWT_ALGORITHM: &str = "HS256";

// ========================================
// Types
// ========================================

/// Claims carried by a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthClaims {
    /// Caller identity
    pub user_id: String,
    /// Optional caller email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued-at (epoch seconds)
    pub iat: i64,
    /// Expiry (epoch seconds)
    pub exp: i64,
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    #[serde(default)]
    typ: Option<String>,
}

/// Token verification failures
///
/// The variants exist for logging; callers collapse all of them into a
/// single access-denied outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not three base64url segments, or a segment is not valid JSON
    Malformed(String),

    /// Header names an algorithm other than HS256
    UnsupportedAlgorithm(String),

    /// Signature does not match the shared secret
    InvalidSignature,

    /// `exp` is at or before the verification time
    Expired { exp: i64, now: i64 },

    /// Shared secret is empty
    InvalidSecret,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Malformed(reason) => write!(f, "Malformed token: {}", reason),
            TokenError::UnsupportedAlgorithm(alg) => write!(f, "Unsupported algorithm: {}", alg),
            TokenError::InvalidSignature => write!(f, "Invalid signature"),
            TokenError::Expired { exp, now } => {
                write!(f, "Token expired at {} (now {})", exp, now)
            }
            TokenError::InvalidSecret => write!(f, "Invalid signing secret"),
        }
    }
}

impl std::error::Error for TokenError {}

// ========================================
// Signing
// ========================================

/// Issue a token for `user_id` valid for `lifetime` from now
pub fn issue_token(
    secret: &str,
    user_id: &str,
    email: Option<&str>,
    lifetime: chrono::Duration,
) -> Result<String, TokenError> {
    let iat = crate::time::now_secs();
    let claims = AuthClaims {
        user_id: user_id.to_string(),
        email: email.map(str::to_string),
        iat,
        exp: iat + lifetime.num_seconds(),
        iss: Some(TOKEN_ISSUER.to_string()),
    };
    sign_claims(secret, &claims)
}

/// Sign arbitrary claims into a compact HS256 token
pub fn sign_claims(secret: &str, claims: &AuthClaims) -> Result<String, TokenError> {
    let header = JwtHeader {
        alg: JWT_ALGORITHM.to_string(),
        typ: Some("JWT".to_string()),
    };
    let header_json =
        serde_json::to_vec(&header).map_err(|e| TokenError::Malformed(e.to_string()))?;
    let claims_json =
        serde_json::to_vec(claims).map_err(|e| TokenError::Malformed(e.to_string()))?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );
    let signature = compute_signature(secret, signing_input.as_bytes())?;

    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

fn compute_signature(secret: &str, input: &[u8]) -> Result<Vec<u8>, TokenError> {
    let mut mac = keyed_mac(secret)?;
    mac.update(input);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// HMAC keyed with `secret`; empty secrets are refused
fn keyed_mac(secret: &str) -> Result<HmacSha256, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }
    HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::InvalidSecret)
}

// ========================================
// Verification
// ========================================

/// Verify `token` against `secret` at the current time
pub fn verify_token(secret: &str, token: &str) -> Result<AuthClaims, TokenError> {
    verify_token_at(secret, token, crate::time::now_secs())
}

/// Verify `token` against `secret` at `now` (epoch seconds)
///
/// Checks, in order: structure, algorithm, signature, expiry.
pub fn verify_token_at(secret: &str, token: &str, now: i64) -> Result<AuthClaims, TokenError> {
    let mut segments = token.trim().split('.');
    let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::Malformed("expected three segments".to_string()));
    };

    let header: JwtHeader = decode_segment(header_b64)?;
    if header.alg != JWT_ALGORITHM {
        return Err(TokenError::UnsupportedAlgorithm(header.alg));
    }

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|e| TokenError::Malformed(format!("signature: {}", e)))?;

    // `hmac` provides constant-time verification.
    let mut mac = keyed_mac(secret)?;
    mac.update(header_b64.as_bytes());
    mac.update(b".");
    mac.update(claims_b64.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| TokenError::InvalidSignature)?;

    let claims: AuthClaims = decode_segment(claims_b64)?;
    if claims.exp <= now {
        return Err(TokenError::Expired {
            exp: claims.exp,
            now,
        });
    }

    Ok(claims)
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::Malformed(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| TokenError::Malformed(e.to_string()))
}
