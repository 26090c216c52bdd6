use std::io::{self, Write};

use chrono::{DateTime, Utc};
use tokenprobe_core::{
    decode_claims, format_duration, format_timestamp, is_jwt, numeric_claim,
    timestamp_from_epoch, CachedTokenPair, Claims, Token,
};

use super::format::{format_claim_value, preview, PREVIEW_CHARS};
use crate::modules::system::ProbeConfig;

const TEXT_CLAIMS: [&str; 6] = ["iss", "sub", "aud", "email", "name", "preferred_username"];
const TIME_CLAIMS: [&str; 3] = ["exp", "iat", "nbf"];

pub(crate) fn print_config<W: Write>(out: &mut W, config: &ProbeConfig) -> io::Result<()> {
    writeln!(out, "OAuth2 Config:")?;
    writeln!(out, "  Flow Type: {}", config.flow.as_str())?;
    writeln!(
        out,
        "  TLS Verification: DISABLED (trusting self-signed certificates)"
    )?;
    writeln!(out, "  Client ID: {}", config.client_id)?;
    match config.client_secret.as_deref() {
        Some(secret) => writeln!(out, "  Client Secret: {secret}")?,
        None => writeln!(out, "  Client Type: Public (no secret)")?,
    }
    writeln!(out, "  Auth URL: {}", config.auth_url)?;
    writeln!(out, "  Token URL: {}", config.token_url)?;
    writeln!(out, "  Scopes: [{}]", config.scopes.join(" "))?;
    writeln!(out)
}

pub(crate) fn print_cache_validation<W: Write>(
    out: &mut W,
    tokens: &CachedTokenPair,
    now: DateTime<Utc>,
) -> io::Result<()> {
    writeln!(out, "Token validation:")?;
    writeln!(out, "  ID Token length: {} characters", tokens.id_token.len())?;
    writeln!(
        out,
        "  Refresh Token length: {} characters",
        tokens.refresh_token.len()
    )?;
    let expiry = decode_claims(&tokens.id_token)
        .ok()
        .and_then(|claims| numeric_claim(&claims, "exp"))
        .and_then(timestamp_from_epoch);
    if let Some(expiry) = expiry {
        writeln!(out, "  ID Token expires: {}", format_timestamp(expiry))?;
        if now > expiry {
            writeln!(out, "  WARNING: ID token is already expired!")?;
        } else {
            writeln!(out, "  ID Token valid for: {}", format_duration(expiry - now))?;
        }
    }
    writeln!(out)
}

/// Writes the human-readable report for `token`. Undecodable tokens only drop
/// their claim sections; the sole error source is the writer.
pub(crate) fn print_token_info<W: Write>(
    out: &mut W,
    label: &str,
    token: &Token,
    now: DateTime<Utc>,
) -> io::Result<()> {
    writeln!(out, "{label}:")?;
    writeln!(out, "  Token Type: {}", token.token_type)?;
    writeln!(
        out,
        "  Access Token (first {PREVIEW_CHARS} chars): {}...",
        preview(&token.access_token, PREVIEW_CHARS)
    )?;
    writeln!(
        out,
        "  Refresh Token (first {PREVIEW_CHARS} chars): {}...",
        preview(&token.refresh_token, PREVIEW_CHARS)
    )?;
    match token.expiry {
        Some(expiry) => {
            writeln!(out, "  Expiry: {}", format_timestamp(expiry))?;
            writeln!(out, "  Time until expiry: {}", format_duration(expiry - now))?;
        }
        None => writeln!(out, "  Expiry: none")?,
    }

    print_refresh_token_details(out, &token.refresh_token, now)?;

    if let Ok(claims) = decode_claims(&token.access_token) {
        print_claims(out, "Access Token Claims", &claims)?;
    }
    if let Some(id_token) = token.id_token() {
        if let Ok(claims) = decode_claims(id_token) {
            print_claims(out, "ID Token Claims", &claims)?;
        }
    }
    writeln!(out)
}

fn print_refresh_token_details<W: Write>(
    out: &mut W,
    refresh_token: &str,
    now: DateTime<Utc>,
) -> io::Result<()> {
    writeln!(out, "  Refresh Token Details:")?;
    writeln!(out, "    Length: {} characters", refresh_token.len())?;
    if !is_jwt(refresh_token) {
        return writeln!(out, "    Format: Opaque (no expiry info available)");
    }
    writeln!(out, "    Format: JWT")?;
    let Ok(claims) = decode_claims(refresh_token) else {
        return Ok(());
    };
    if let Some(expiry) = numeric_claim(&claims, "exp").and_then(timestamp_from_epoch) {
        writeln!(out, "    Expires: {}", format_timestamp(expiry))?;
        if now > expiry {
            writeln!(out, "    Status: EXPIRED")?;
        } else {
            writeln!(out, "    Valid for: {}", format_duration(expiry - now))?;
        }
    }
    if let Some(issued) = numeric_claim(&claims, "iat").and_then(timestamp_from_epoch) {
        writeln!(out, "    Issued: {}", format_timestamp(issued))?;
        writeln!(out, "    Age: {}", format_duration(now - issued))?;
    }
    Ok(())
}

fn print_claims<W: Write>(out: &mut W, heading: &str, claims: &Claims) -> io::Result<()> {
    writeln!(out, "  {heading}:")?;
    for key in TEXT_CLAIMS {
        if let Some(value) = claims.get(key) {
            writeln!(out, "    {key}: {}", format_claim_value(value))?;
        }
    }
    for key in TIME_CLAIMS {
        let Some(seconds) = numeric_claim(claims, key) else {
            continue;
        };
        match timestamp_from_epoch(seconds) {
            Some(at) => writeln!(out, "    {key}: {seconds} ({})", format_timestamp(at))?,
            None => writeln!(out, "    {key}: {seconds}")?,
        }
    }
    if let Some(groups) = claims.get("groups") {
        writeln!(out, "    groups: {}", format_claim_value(groups))?;
    }
    Ok(())
}
