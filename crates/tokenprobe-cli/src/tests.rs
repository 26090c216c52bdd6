use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use serde_json::{json, Value};
use tempfile::tempdir;
use tokenprobe_core::{RefreshError, Token};

use crate::modules::refresh::http::TokenSource;
use crate::modules::refresh::{run_probe, LoopOutcome, ProbeOutcome};
use crate::modules::system::types::FlowType;
use crate::modules::system::{LoopTimings, ProbeConfig};

pub(crate) fn jwt_with_claims(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","kid":"test"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub(crate) fn whole_second_now() -> DateTime<Utc> {
    Utc.timestamp_opt(Utc::now().timestamp(), 0)
        .single()
        .expect("timestamp")
}

pub(crate) fn render<F>(write: F) -> String
where
    F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
{
    let mut out = Vec::new();
    write(&mut out).expect("render");
    String::from_utf8(out).expect("utf8")
}

pub(crate) fn scripted_token(access_token: &str) -> Token {
    Token {
        access_token: access_token.to_string(),
        refresh_token: format!("refresh-for-{access_token}"),
        token_type: "bearer".to_string(),
        expiry: Some(Utc::now() + ChronoDuration::seconds(3600)),
        ..Token::default()
    }
}

/// Replays canned refresh results and records the tokens it was asked to refresh.
pub(crate) struct ScriptedSource {
    results: Mutex<VecDeque<Result<Token, RefreshError>>>,
    seen: Mutex<Vec<Token>>,
}

impl ScriptedSource {
    pub(crate) fn new(results: Vec<Result<Token, RefreshError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn seen(&self) -> Vec<Token> {
        self.seen.lock().expect("seen lock").clone()
    }
}

#[async_trait]
impl TokenSource for ScriptedSource {
    async fn token(&self, current: &Token) -> Result<Token, RefreshError> {
        self.seen.lock().expect("seen lock").push(current.clone());
        self.results
            .lock()
            .expect("results lock")
            .pop_front()
            .unwrap_or_else(|| Err(RefreshError::Transport("script exhausted".to_string())))
    }
}

fn harness_config(cache_dir: std::path::PathBuf) -> ProbeConfig {
    ProbeConfig {
        flow: FlowType::Password,
        client_id: "kubelogin-test".to_string(),
        client_secret: Some("kubelogin-test-secret".to_string()),
        auth_url: "https://dex.invalid/auth".to_string(),
        token_url: "https://dex.invalid/token".to_string(),
        scopes: vec!["openid".to_string()],
        cache_dir: Some(cache_dir),
        timings: LoopTimings {
            wait: std::time::Duration::ZERO,
            forced_expiry: std::time::Duration::from_secs(30),
            pause: std::time::Duration::ZERO,
            max_cycles: None,
        },
    }
}

#[tokio::test]
async fn run_reports_cached_claims_and_halts_on_consumed_token() {
    let cache = tempdir().expect("tempdir");
    let id_token = jwt_with_claims(&json!({
        "iss": "https://dex.127.0.0.1.nip.io:32000",
        "sub": "alice",
        "exp": Utc::now().timestamp() + 3600,
    }));
    std::fs::write(
        cache.path().join("kubelogin-cache"),
        json!({ "id_token": id_token, "refresh_token": "rt-123" }).to_string(),
    )
    .expect("write cache");

    let source = ScriptedSource::new(vec![Err(RefreshError::Endpoint {
        status: 400,
        code: Some("invalid_request".to_string()),
        description: Some(
            "Refresh token is invalid or has already been claimed by another client.".to_string(),
        ),
        uri: None,
        body: String::new(),
    })]);
    let mut out = Vec::new();
    let outcome = run_probe(&mut out, &harness_config(cache.path().to_path_buf()), &source)
        .await
        .expect("run");
    let output = String::from_utf8(out).expect("utf8");

    assert!(matches!(
        outcome,
        ProbeOutcome::Finished(LoopOutcome::Failed { cycles: 0, .. })
    ));
    assert!(output.contains("Checking file: kubelogin-cache\n"));
    assert!(output.contains("Successfully loaded tokens from: kubelogin-cache"));
    assert!(output.contains("  ID Token valid for: "));
    let claims = output
        .split("  Access Token Claims:\n")
        .nth(1)
        .expect("access token claims");
    assert!(claims.contains("    sub: alice\n"));
    assert!(!output.contains("groups:"));
    assert!(output.contains("Warning: Refresh token appears to be very short"));
    assert!(output.contains("Diagnosis: Refresh token has been consumed or expired"));
    assert!(output.ends_with("Token refresh loop completed.\n"));

    let seen = source.seen();
    assert_eq!(seen[0].access_token, id_token);
    assert_eq!(seen[0].refresh_token, "rt-123");
}

#[tokio::test]
async fn run_aborts_when_cache_missing() {
    let home = tempdir().expect("tempdir");
    let source = ScriptedSource::new(Vec::new());
    let mut out = Vec::new();
    let outcome = run_probe(&mut out, &harness_config(home.path().join("absent")), &source)
        .await
        .expect("run");
    let output = String::from_utf8(out).expect("utf8");

    assert!(matches!(outcome, ProbeOutcome::Aborted));
    assert!(output.contains("Failed to read token cache: "));
    assert!(output.contains("kubectl --user oidc get pods -A"));
    assert!(source.seen().is_empty());
}

#[tokio::test]
async fn run_aborts_on_empty_refresh_token() {
    let cache = tempdir().expect("tempdir");
    std::fs::write(cache.path().join("entry"), r#"{"id_token":"a.b.c"}"#).expect("write cache");
    let source = ScriptedSource::new(Vec::new());
    let mut out = Vec::new();
    let outcome = run_probe(&mut out, &harness_config(cache.path().to_path_buf()), &source)
        .await
        .expect("run");
    let output = String::from_utf8(out).expect("utf8");

    assert!(matches!(outcome, ProbeOutcome::Aborted));
    assert!(output.contains("Error: Refresh token is empty in cache\n"));
    assert!(output.contains("Note: Some OIDC configurations may not provide refresh tokens"));
    assert!(source.seen().is_empty());
}

#[tokio::test]
async fn run_lists_every_checked_file_before_loading() {
    let cache = tempdir().expect("tempdir");
    std::fs::write(cache.path().join("a-broken"), "{").expect("write cache");
    std::fs::write(
        cache.path().join("b-cache"),
        r#"{"id_token":"a.b.c","refresh_token":"rt-0123456789"}"#,
    )
    .expect("write cache");
    std::fs::write(cache.path().join("c-unvisited"), "{}").expect("write cache");
    let source = ScriptedSource::new(Vec::new());
    let mut out = Vec::new();
    run_probe(&mut out, &harness_config(cache.path().to_path_buf()), &source)
        .await
        .expect("run");
    let output = String::from_utf8(out).expect("utf8");

    let checked: Vec<&str> = output
        .lines()
        .filter(|line| line.starts_with("Checking file: "))
        .collect();
    assert_eq!(checked, vec!["Checking file: a-broken", "Checking file: b-cache"]);
    assert!(output.contains("Successfully loaded tokens from: b-cache\n"));
}

#[tokio::test]
async fn run_reports_every_checked_file_when_none_parses() {
    let cache = tempdir().expect("tempdir");
    std::fs::write(cache.path().join("only"), "[]").expect("write cache");
    let source = ScriptedSource::new(Vec::new());
    let mut out = Vec::new();
    let outcome = run_probe(&mut out, &harness_config(cache.path().to_path_buf()), &source)
        .await
        .expect("run");
    let output = String::from_utf8(out).expect("utf8");

    assert!(matches!(outcome, ProbeOutcome::Aborted));
    assert!(output.contains("Checking file: only\n"));
    assert!(output.contains("Failed to read token cache: no valid token cache file found\n"));
}

#[tokio::test]
async fn run_treats_null_refresh_token_as_empty() {
    let cache = tempdir().expect("tempdir");
    std::fs::write(
        cache.path().join("entry"),
        r#"{"id_token":"a.b.c","refresh_token":null}"#,
    )
    .expect("write cache");
    let source = ScriptedSource::new(Vec::new());
    let mut out = Vec::new();
    let outcome = run_probe(&mut out, &harness_config(cache.path().to_path_buf()), &source)
        .await
        .expect("run");
    let output = String::from_utf8(out).expect("utf8");

    assert!(matches!(outcome, ProbeOutcome::Aborted));
    assert!(output.contains("Successfully loaded tokens from: entry\n"));
    assert!(output.contains("Error: Refresh token is empty in cache\n"));
    assert!(source.seen().is_empty());
}
