use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    Password,
    DeviceCode,
}

impl FlowType {
    /// Anything other than `device-code`, including no value, selects the password flow.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("device-code") => Self::DeviceCode,
            _ => Self::Password,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::DeviceCode => "device-code",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub flow: FlowType,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub auth_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
    pub cache_dir: Option<PathBuf>,
    pub timings: LoopTimings,
}

#[derive(Debug, Clone, Copy)]
pub struct LoopTimings {
    pub wait: Duration,
    pub forced_expiry: Duration,
    pub pause: Duration,
    pub max_cycles: Option<u32>,
}

impl Default for LoopTimings {
    fn default() -> Self {
        Self {
            wait: Duration::from_secs(35),
            forced_expiry: Duration::from_secs(30),
            pause: Duration::from_secs(3),
            max_cycles: None,
        }
    }
}
