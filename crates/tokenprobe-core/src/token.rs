use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};

use crate::cache::CachedTokenPair;

/// Tokens are treated as expired this long before their nominal expiry.
pub const EXPIRY_DELTA_SECONDS: i64 = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expiry: Option<DateTime<Utc>>,
    pub extra: Map<String, Value>,
}

impl Token {
    /// Seeds a token from the kubelogin cache; the ID token stands in for the access token.
    pub fn from_cache(pair: &CachedTokenPair, expiry: DateTime<Utc>) -> Self {
        Self {
            access_token: pair.id_token.clone(),
            refresh_token: pair.refresh_token.clone(),
            token_type: String::new(),
            expiry: Some(expiry),
            extra: Map::new(),
        }
    }

    pub fn id_token(&self) -> Option<&str> {
        self.extra
            .get("id_token")
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry - Duration::seconds(EXPIRY_DELTA_SECONDS) < now,
            None => false,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && !self.is_expired_at(now)
    }

    pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry = Some(expiry);
        self
    }
}
