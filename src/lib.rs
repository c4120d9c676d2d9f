//! lagwatch
//!
//! Consumer-lag health checks for Kafka consumer groups: decide whether a
//! group is keeping up with its topics by combining per-partition offset
//! lag against the high watermark with a staleness probe over a bounded
//! lookback window, and fold the per-partition verdicts into a single
//! exit-status-friendly report.

// Strict linting configuration
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(unused_imports)]
#![warn(unused_variables)]
#![warn(dead_code)]

/// Best-effort topic creation for the demo producer/consumer binaries.
pub mod admin;
/// The health-check core: locator, sampler, probe, evaluator, aggregator.
pub mod check;
/// The shared, read-only broker connection for health-check queries.
pub mod client;
/// Configuration structures and layered loading (flags, env, JSON file).
pub mod config;
/// The artificially slow demo consumer loop.
pub mod consume;
/// Error types and the crate result alias.
pub mod error;
/// The UUID-payload demo producer loop.
pub mod produce;

pub use check::{
    aggregate, evaluate, HealthCheck, HealthReport, OffsetSampler, OverallHealth,
    PartitionHealth, PartitionLocator, PartitionOffsetSnapshot, PartitionVerdict,
    StalenessProbe, StalenessSample, TopicPartition,
};
pub use client::LagwatchClient;
pub use config::{CheckConfig, HealthThresholds, KafkaConfig, PartialKafkaConfig};
pub use error::{Error, Result};

use tracing::info;

/// The current version of the crate, sourced from `Cargo.toml` at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Settings for process-wide initialization: logging only, for now.
#[derive(Debug, Clone)]
pub struct InitConfig {
    /// Logging filter string, compatible with `tracing_subscriber::EnvFilter`.
    /// Example: "info,lagwatch=debug"
    pub log_filter: String,
    /// Emit log lines as JSON instead of human-readable text.
    pub json_logs: bool,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Initializes the process with default [`InitConfig`] settings.
///
/// Convenience wrapper around [`init_with_config`].
pub fn init() -> Result<()> {
    init_with_config(&InitConfig::default())
}

/// Initializes global logging. Call once at the start of a binary.
///
/// `RUST_LOG` takes precedence over the configured filter so operators can
/// raise verbosity without a restart flag. Uses `try_init` so a logger
/// already installed (e.g. in tests) is not a fatal condition.
pub fn init_with_config(config: &InitConfig) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.clone()));

    let builder = fmt().with_env_filter(filter);
    let init_result = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    init_result
        .map_err(|e| Error::config(format!("Failed to initialize tracing subscriber: {}", e)))?;

    info!(version = VERSION, "lagwatch initialized");
    Ok(())
}
