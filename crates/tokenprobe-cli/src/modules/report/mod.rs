mod format;
mod render;

pub(crate) use render::{print_cache_validation, print_config, print_token_info};
