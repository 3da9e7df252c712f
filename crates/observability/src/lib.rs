//! Tracing and logging setup shared by every process that places orders.

pub mod config;
pub mod tracing;

pub use config::{LogFormat, ObservabilityConfig};

/// Initialize process-wide tracing from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(&ObservabilityConfig::from_env());
}

/// Initialize process-wide tracing from an explicit configuration.
pub fn init_with(config: &ObservabilityConfig) {
    tracing::init(config);
}
