pub(crate) mod config;
pub(crate) mod types;

pub(crate) use config::{build_config, build_http_client};
pub(crate) use types::{LoopTimings, ProbeConfig};
