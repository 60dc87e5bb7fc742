//! System-level utilities: home, cache and config locations

pub mod paths;

pub use paths::{default_config_path, generate_utc_timestamp, occucube_home};
