use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::ProbeError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CachedTokenPair {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id_token: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub refresh_token: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone)]
pub struct LoadedCache {
    pub path: PathBuf,
    pub tokens: CachedTokenPair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheWarning {
    IdTokenNotJwt,
    RefreshTokenShort,
}

impl CacheWarning {
    pub fn message(self) -> &'static str {
        match self {
            Self::IdTokenNotJwt => "ID token doesn't appear to be a JWT",
            Self::RefreshTokenShort => "Refresh token appears to be very short",
        }
    }
}

pub fn default_cache_dir() -> Result<PathBuf, ProbeError> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| ProbeError::NotFound("failed to get home directory".to_string()))?;
    Ok(Path::new(&home)
        .join(".kube")
        .join("cache")
        .join("oidc-login"))
}

/// Lists the entries of a cache directory, sorted by name.
pub fn list_cache_entries(dir: &Path) -> Result<Vec<PathBuf>, ProbeError> {
    let entries = fs::read_dir(dir).map_err(|err| {
        ProbeError::NotFound(format!(
            "failed to read cache directory {}: {err}",
            dir.display()
        ))
    })?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .collect();
    paths.sort();
    Ok(paths)
}

pub fn load_cache_entry(path: &Path) -> Result<CachedTokenPair, ProbeError> {
    let contents = fs::read(path).map_err(|err| {
        ProbeError::NotFound(format!("failed to read {}: {err}", path.display()))
    })?;
    Ok(parse_cache_file(&contents)?)
}

/// Returns the first file in `dir` (by name) that parses as a kubelogin token cache.
pub fn read_token_cache(dir: &Path) -> Result<LoadedCache, ProbeError> {
    for path in list_cache_entries(dir)? {
        debug!(path = %path.display(), "checking cache file");
        match load_cache_entry(&path) {
            Ok(tokens) => return Ok(LoadedCache { path, tokens }),
            Err(err) => debug!(path = %path.display(), "skipping cache file: {err}"),
        }
    }
    Err(no_cache_found())
}

pub fn no_cache_found() -> ProbeError {
    ProbeError::NotFound("no valid token cache file found".to_string())
}

fn parse_cache_file(contents: &[u8]) -> Result<CachedTokenPair, serde_json::Error> {
    // Only JSON objects count; serde would otherwise accept a sequence for the struct.
    let value: serde_json::Value = serde_json::from_slice(contents)?;
    if !value.is_object() {
        return Err(serde::de::Error::custom("cache file is not a JSON object"));
    }
    serde_json::from_value(value)
}

pub fn validate_cached_tokens(tokens: &CachedTokenPair) -> Result<Vec<CacheWarning>, ProbeError> {
    if tokens.id_token.is_empty() {
        return Err(ProbeError::MissingToken { field: "ID token" });
    }
    if tokens.refresh_token.is_empty() {
        return Err(ProbeError::MissingToken {
            field: "Refresh token",
        });
    }
    let mut warnings = Vec::new();
    if !tokens.id_token.contains('.') {
        warnings.push(CacheWarning::IdTokenNotJwt);
    }
    if !tokens.refresh_token.contains('.') && tokens.refresh_token.len() < 10 {
        warnings.push(CacheWarning::RefreshTokenShort);
    }
    Ok(warnings)
}
