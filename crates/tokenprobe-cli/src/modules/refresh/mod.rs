mod actions;
pub(crate) mod http;
pub(crate) mod types;

pub(crate) use actions::run_probe;
pub(crate) use http::HttpTokenSource;
pub(crate) use types::{LoopOutcome, ProbeOutcome};
