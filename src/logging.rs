//! Tracing subscriber setup for applications embedding the client

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;
use crate::{BmkgError, Result};

/// Install a global subscriber. `RUST_LOG` takes precedence over the configured level.
///
/// Fails if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = if config.format == "json" {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .json()
            .try_init()
    } else {
        fmt().with_env_filter(filter).with_target(true).try_init()
    };

    installed.map_err(|e| BmkgError::config(format!("Failed to install tracing subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig::default();
        // Another test may have installed a subscriber first; either way the
        // second call must be rejected.
        let _ = init(&config);
        assert!(matches!(init(&config), Err(BmkgError::Config { .. })));
    }
}
