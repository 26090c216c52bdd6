use std::time::Duration;

use tracing::debug;

use super::types::{FlowType, LoopTimings, ProbeConfig};
use crate::cli_args::Cli;
use crate::DEFAULT_CLIENT_SECRET;

pub(crate) fn build_config(cli: &Cli) -> anyhow::Result<ProbeConfig> {
    let flow = FlowType::from_env_value(cli.flow.as_deref());
    let client_secret = match flow {
        FlowType::DeviceCode => None,
        FlowType::Password => Some(
            cli.client_secret
                .clone()
                .filter(|secret| !secret.is_empty())
                .unwrap_or_else(|| DEFAULT_CLIENT_SECRET.to_string()),
        ),
    };
    if cli.client_id.trim().is_empty() {
        anyhow::bail!("client id is required");
    }

    let issuer = cli.issuer.trim_end_matches('/');
    let auth_url = format!("{issuer}/auth");
    let token_url = format!("{issuer}/token");
    reqwest::Url::parse(&token_url)
        .map_err(|err| anyhow::anyhow!("invalid issuer URL {}: {err}", cli.issuer))?;
    debug!(flow = flow.as_str(), token_url = %token_url, "probe config resolved");

    Ok(ProbeConfig {
        flow,
        client_id: cli.client_id.clone(),
        client_secret,
        auth_url,
        token_url,
        scopes: cli.scopes.clone(),
        cache_dir: cli.cache_dir.clone(),
        timings: LoopTimings {
            wait: Duration::from_secs(cli.wait_secs),
            forced_expiry: Duration::from_secs(cli.forced_expiry_secs),
            pause: Duration::from_secs(cli.pause_secs),
            max_cycles: cli.max_cycles,
        },
    })
}

/// The Dex test deployment uses a self-signed certificate, so verification is off.
pub(crate) fn build_http_client() -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .build()?)
}
