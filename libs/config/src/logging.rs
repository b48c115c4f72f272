//! Tracing subscriber bootstrap for hosts embedding the engine

use crate::engine_config::LoggingSettings;
use anyhow::{anyhow, Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG` when set, otherwise from the configured level
pub fn env_filter(settings: &LoggingSettings) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.level)
            .with_context(|| format!("Invalid log level directive {:?}", settings.level)),
    }
}

/// Install the global subscriber; fails if one is already set
pub fn init_tracing(settings: &LoggingSettings) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(settings)?);
    let result = if settings.json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    result.map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_settings() {
        let settings = LoggingSettings {
            level: "amm=debug,warn".to_string(),
            json: false,
        };
        assert!(env_filter(&settings).is_ok());
    }

    #[test]
    fn test_invalid_directive() {
        let settings = LoggingSettings {
            level: "amm=notalevel".to_string(),
            json: false,
        };
        if std::env::var("RUST_LOG").is_err() {
            assert!(env_filter(&settings).is_err());
        }
    }

    #[test]
    fn test_second_init_fails() {
        let settings = LoggingSettings::default();
        let _ = init_tracing(&settings);
        assert!(init_tracing(&settings).is_err());
    }
}
