//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, ObservabilityConfig};

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .with_target(false)
            .try_init()
            .is_ok(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_ok(),
    };

    if installed {
        if let Some(raw) = &config.unknown_format {
            ::tracing::warn!(log_format = %raw, "unknown LOG_FORMAT, using json");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let cfg = ObservabilityConfig {
            format: LogFormat::Pretty,
            ..ObservabilityConfig::default()
        };
        init(&cfg);
        init(&cfg);
        init(&ObservabilityConfig::default());
    }

    #[test]
    fn invalid_filter_does_not_panic() {
        let cfg = ObservabilityConfig {
            filter: "[[not a directive".to_string(),
            ..ObservabilityConfig::default()
        };
        init(&cfg);
    }
}
