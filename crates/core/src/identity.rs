//! Identity claims carried by HS256-signed bearer tokens
//!
//! Tokens are issued elsewhere (login / OTP flows). This module only decodes
//! and verifies them against the shared secret and derives the canonical
//! [`Identity`] used for every authorization decision.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use sha2::Sha256;

use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

const BEARER_PREFIX: &str = "Bearer ";

/// Canonical identity of an authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Token payload. Read-only once issued.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "string_or_number"
    )]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Expiry, seconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// `id`, falling back to `email`. Empty values count as absent.
    pub fn identity(&self) -> Option<Identity> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.email.as_deref().filter(|email| !email.is_empty()))
            .map(Identity::new)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(JsonValue::String(s)) => Some(s),
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Extract the token from an `Authorization` header value.
///
/// Anything other than a non-empty `Bearer` credential is treated as absent.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verifies HS256 tokens against a shared secret
#[derive(Clone)]
pub struct TokenVerifier {
    secret: Vec<u8>,
}

impl TokenVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Verify an optional token and derive the caller's identity
    pub fn verify(&self, token: Option<&str>) -> Result<Identity, AuthError> {
        let token = token.ok_or(AuthError::Missing)?;
        self.decode(token)?.identity().ok_or(AuthError::Invalid)
    }

    /// Decode and verify a token, checking expiry against the current time
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        self.decode_at(token, chrono::Utc::now().timestamp())
    }

    fn decode_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::Invalid);
        };

        let header: JwtHeader = decode_segment(header_b64)?;
        if header.alg != "HS256" {
            return Err(AuthError::Invalid);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AuthError::Invalid)?;
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| AuthError::Invalid)?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::Invalid)?;

        let claims: Claims = decode_segment(claims_b64)?;
        if claims.exp.is_some_and(|exp| exp <= now) {
            return Err(AuthError::Invalid);
        }

        Ok(claims)
    }
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::Invalid)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::Invalid)
}

/// Failure to produce a signed token
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("Failed to serialize token segment: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid signing key")]
    Key,
}

/// Sign claims as an HS256 token
pub fn encode_hs256(claims: &Claims, secret: impl AsRef<[u8]>) -> Result<String, SignError> {
    let header = JwtHeader {
        alg: "HS256".to_string(),
        typ: Some("JWT".to_string()),
    };
    let message = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?)
    );

    let mut mac = HmacSha256::new_from_slice(secret.as_ref()).map_err(|_| SignError::Key)?;
    mac.update(message.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{message}.{signature}"))
}
