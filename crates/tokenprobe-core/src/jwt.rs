use std::borrow::Cow;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde_json::{Map, Value};

use crate::error::ProbeError;

pub type Claims = Map<String, Value>;

/// Decodes the payload segment of a compact JWT without verifying it.
pub fn decode_claims(token: &str) -> Result<Claims, ProbeError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(ProbeError::Format {
            segments: parts.len(),
        });
    }
    let payload = pad_segment(parts[1]);
    let decoded = URL_SAFE.decode(payload.as_bytes())?;
    Ok(serde_json::from_slice::<Claims>(&decoded)?)
}

pub fn is_jwt(token: &str) -> bool {
    token.split('.').count() == 3
}

pub fn pad_segment(segment: &str) -> Cow<'_, str> {
    let remainder = segment.len() % 4;
    if remainder == 0 {
        return Cow::Borrowed(segment);
    }
    let mut padded = String::with_capacity(segment.len() + 4 - remainder);
    padded.push_str(segment);
    padded.extend(std::iter::repeat('=').take(4 - remainder));
    Cow::Owned(padded)
}

/// Epoch seconds for `exp`/`iat`/`nbf` style claims; non-numeric values yield `None`.
pub fn numeric_claim(claims: &Claims, name: &str) -> Option<i64> {
    claims.get(name).and_then(Value::as_f64).map(|value| value as i64)
}
