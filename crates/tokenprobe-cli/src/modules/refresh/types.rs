use serde::Deserialize;

#[derive(Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_uri: Option<String>,
}

#[derive(Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug)]
pub enum LoopOutcome {
    Completed {
        cycles: u32,
    },
    Failed {
        cycles: u32,
        reason: tokenprobe_core::RefreshError,
    },
}

#[derive(Debug)]
pub enum ProbeOutcome {
    /// The cache could not be used; nothing was refreshed.
    Aborted,
    Finished(LoopOutcome),
}
