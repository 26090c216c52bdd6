use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::{DEFAULT_CLIENT_ID, DEFAULT_ISSUER};

#[derive(Parser)]
#[command(name = "tokenprobe")]
#[command(about = "Exercise OIDC refresh-token cycles against a Dex test provider")]
pub struct Cli {
    #[arg(long, env = "DEX_FLOW", help = "Dex flow under test (device-code or password)")]
    pub flow: Option<String>,
    #[arg(long, env = "DEX_CLIENT_ID", default_value = DEFAULT_CLIENT_ID)]
    pub client_id: String,
    #[arg(long, env = "DEX_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,
    #[arg(long, env = "DEX_ISSUER", default_value = DEFAULT_ISSUER)]
    pub issuer: String,
    #[arg(long = "scope", default_values = ["openid", "profile", "email"])]
    pub scopes: Vec<String>,
    #[arg(long, env = "TOKENPROBE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
    #[arg(long, default_value_t = 35, help = "Countdown before each refresh attempt")]
    pub wait_secs: u64,
    #[arg(long, default_value_t = 30, help = "Expiry forced onto each token")]
    pub forced_expiry_secs: u64,
    #[arg(long, default_value_t = 3, help = "Pause after a successful refresh")]
    pub pause_secs: u64,
    #[arg(long, help = "Stop after this many successful refreshes")]
    pub max_cycles: Option<u32>,
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
