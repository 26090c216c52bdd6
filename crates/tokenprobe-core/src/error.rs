use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid JWT format: expected 3 segments, found {segments}")]
    Format { segments: usize },
    #[error("failed to decode JWT payload: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("failed to unmarshal JWT claims: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0}")]
    NotFound(String),
    #[error("{field} is empty in cache")]
    MissingToken { field: &'static str },
}

/// Failure of a refresh-token grant.
///
/// The rendered messages follow the wording common OAuth2 client libraries
/// use, since operators match on them (see [`crate::diagnosis::classify`]).
#[derive(Debug, Error, Clone)]
pub enum RefreshError {
    #[error("{}", endpoint_message(.status, .code, .description, .uri, .body))]
    Endpoint {
        status: u16,
        code: Option<String>,
        description: Option<String>,
        uri: Option<String>,
        body: String,
    },
    #[error("oauth2: cannot fetch token: {0}")]
    Transport(String),
    #[error("oauth2: cannot parse json: {0}")]
    InvalidResponse(String),
    #[error("oauth2: server response missing access_token")]
    MissingAccessToken,
    #[error("oauth2: token expired and refresh token is not set")]
    NoRefreshToken,
}

fn endpoint_message(
    status: &u16,
    code: &Option<String>,
    description: &Option<String>,
    uri: &Option<String>,
    body: &str,
) -> String {
    let Some(code) = code.as_deref().filter(|code| !code.is_empty()) else {
        return format!("oauth2: cannot fetch token: {status}\nResponse: {body}");
    };
    let mut message = format!("oauth2: {code:?}");
    if let Some(description) = description.as_deref().filter(|value| !value.is_empty()) {
        message.push_str(&format!(" {description:?}"));
    }
    if let Some(uri) = uri.as_deref().filter(|value| !value.is_empty()) {
        message.push_str(&format!(" {uri:?}"));
    }
    message
}
