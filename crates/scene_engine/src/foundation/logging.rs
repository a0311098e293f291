//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

use crate::core::config::LoggingConfig;

/// Initialize the logging system
///
/// `RUST_LOG` wins when it is set; otherwise the filter from the logging
/// config is used. Calling this more than once is harmless.
pub fn init(config: &LoggingConfig) {
    let env = env_logger::Env::default().default_filter_or(config.default_filter.as_str());
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
