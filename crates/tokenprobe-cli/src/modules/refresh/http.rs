use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde_json::{Map, Value};
use tokenprobe_core::{RefreshError, Token};
use tracing::debug;

use super::types::{TokenErrorResponse, TokenResponse};
use crate::modules::system::ProbeConfig;

/// Yields a usable token, refreshing `current` when it is no longer valid.
#[async_trait]
pub(crate) trait TokenSource: Send + Sync {
    async fn token(&self, current: &Token) -> Result<Token, RefreshError>;
}

pub(crate) struct HttpTokenSource {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: Option<String>,
}

impl HttpTokenSource {
    pub(crate) fn new(client: reqwest::Client, config: &ProbeConfig) -> Self {
        Self {
            client,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }
}

#[async_trait]
impl TokenSource for HttpTokenSource {
    async fn token(&self, current: &Token) -> Result<Token, RefreshError> {
        if current.is_valid_at(Utc::now()) {
            debug!("token still valid; skipping refresh grant");
            return Ok(current.clone());
        }
        if current.refresh_token.is_empty() {
            return Err(RefreshError::NoRefreshToken);
        }

        let mut params = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", current.refresh_token.as_str()),
        ];
        let mut request = self.client.post(&self.token_url);
        match self.client_secret.as_deref() {
            Some(secret) => request = request.basic_auth(&self.client_id, Some(secret)),
            None => params.push(("client_id", self.client_id.as_str())),
        }

        debug!(url = %self.token_url, "refresh grant request");
        let start = Instant::now();
        let response = request
            .form(&params)
            .send()
            .await
            .map_err(|err| RefreshError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| RefreshError::Transport(err.to_string()))?;
        debug!(
            url = %self.token_url,
            status = %status,
            elapsed_ms = start.elapsed().as_millis(),
            "refresh grant response"
        );

        if !status.is_success() {
            return Err(endpoint_error(status.as_u16(), body));
        }
        parse_token_response(&body, current, Utc::now())
    }
}

fn endpoint_error(status: u16, body: String) -> RefreshError {
    match serde_json::from_str::<TokenErrorResponse>(&body) {
        Ok(error) => RefreshError::Endpoint {
            status,
            code: Some(error.error),
            description: error.error_description,
            uri: error.error_uri,
            body,
        },
        Err(_) => RefreshError::Endpoint {
            status,
            code: None,
            description: None,
            uri: None,
            body,
        },
    }
}

pub(crate) fn parse_token_response(
    body: &str,
    current: &Token,
    now: DateTime<Utc>,
) -> Result<Token, RefreshError> {
    let raw: Map<String, Value> =
        serde_json::from_str(body).map_err(|err| RefreshError::InvalidResponse(err.to_string()))?;
    let parsed: TokenResponse = serde_json::from_value(Value::Object(raw.clone()))
        .map_err(|err| RefreshError::InvalidResponse(err.to_string()))?;
    if parsed.access_token.is_empty() {
        return Err(RefreshError::MissingAccessToken);
    }
    let refresh_token = parsed
        .refresh_token
        .filter(|token| !token.is_empty())
        .unwrap_or_else(|| current.refresh_token.clone());
    let expiry = parsed
        .expires_in
        .filter(|seconds| *seconds > 0)
        .and_then(ChronoDuration::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime));
    Ok(Token {
        access_token: parsed.access_token,
        refresh_token,
        token_type: parsed.token_type,
        expiry,
        extra: raw,
    })
}
