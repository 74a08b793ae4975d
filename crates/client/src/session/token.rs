//! Local JWT inspection.
//!
//! The session never verifies signatures - that is the backend's job. It
//! only needs the payload's `exp` claim to decide, without a network call,
//! whether a stored access token is worth presenting. Anything that fails to
//! decode is treated exactly like an expired token.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when decoding a token payload.
#[derive(Debug, Error)]
pub(crate) enum TokenDecodeError {
    /// The token is not three dot-separated segments.
    #[error("token is not a JWT")]
    Malformed,

    /// The payload segment is not valid base64url.
    #[error("token payload is not base64url: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The payload is not a JSON claims object.
    #[error("token payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The claims this client cares about.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Claims {
    /// Expiry as a Unix timestamp. A token without one is never trusted.
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl Claims {
    /// Whether the token is expired at `now`. Missing `exp` counts as
    /// expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_none_or(|exp| exp <= now.timestamp())
    }
}

/// Decode the claims of a JWT without verifying it.
pub(crate) fn decode_claims(token: &str) -> Result<Claims, TokenDecodeError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenDecodeError::Malformed);
    };

    // Tolerate encoders that pad; URL_SAFE_NO_PAD rejects '='.
    let raw = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&raw)?)
}
