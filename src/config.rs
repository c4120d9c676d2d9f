use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable carrying the broker list (comma separated).
pub const ENV_BROKERS: &str = "KAFKA_BOOTSTRAP_SERVERS";
/// Environment variable carrying the consumer group id.
pub const ENV_GROUP_ID: &str = "KAFKA_CONSUMER_GROUP_ID";
/// Environment variable carrying the topic list (comma separated).
pub const ENV_TOPICS: &str = "KAFKA_TOPICS";

/// Connection identity for the consumer group under test: where the brokers
/// are, which group to inspect, and which topics that group is bound to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    /// Kafka broker addresses (e.g. `"broker-1:9092"`).
    pub brokers: Vec<String>,
    /// The consumer group whose committed offsets are checked.
    pub group_id: String,
    /// Topics the group is expected to consume.
    pub topics: Vec<String>,
}

impl KafkaConfig {
    /// Validates the connection identity. Empty lists and blank ids are
    /// startup errors, never runtime ones.
    pub fn validate(&self) -> Result<()> {
        if self.brokers.is_empty() || self.brokers.iter().any(|b| b.trim().is_empty()) {
            return Err(Error::config("Kafka brokers list cannot be empty."));
        }
        if self.group_id.trim().is_empty() {
            return Err(Error::config("Kafka group_id cannot be empty."));
        }
        if self.topics.is_empty() || self.topics.iter().any(|t| t.trim().is_empty()) {
            return Err(Error::config("Kafka topics list cannot be empty."));
        }
        Ok(())
    }

    /// Resolves the full configuration from its three layers, highest
    /// precedence first: CLI flags, then environment variables, then an
    /// optional JSON config file. A field missing from every layer is a
    /// configuration error naming the ways to supply it.
    pub fn resolve(flags: PartialKafkaConfig, config_file: Option<&Path>) -> Result<Self> {
        Self::resolve_with_fallback(flags, config_file, PartialKafkaConfig::default())
    }

    /// Same as [`KafkaConfig::resolve`] but with a `fallback` layer below
    /// everything else, for binaries that can default a field (the producer
    /// does not care which group id it runs under) without shadowing any
    /// operator-supplied source.
    pub fn resolve_with_fallback(
        flags: PartialKafkaConfig,
        config_file: Option<&Path>,
        fallback: PartialKafkaConfig,
    ) -> Result<Self> {
        let file_layer = match config_file {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading config from json file");
                PartialKafkaConfig::from_json_file(path)?
            }
            None => PartialKafkaConfig::default(),
        };
        let merged = flags
            .or(PartialKafkaConfig::from_env())
            .or(file_layer)
            .or(fallback);

        let config = Self {
            brokers: merged.brokers.ok_or_else(|| {
                Error::config(format!(
                    "Kafka brokers missing: set --kafka-bootstrap-servers, {} or \"brokers\" in the config file",
                    ENV_BROKERS
                ))
            })?,
            group_id: merged.group_id.ok_or_else(|| {
                Error::config(format!(
                    "Kafka group id missing: set --kafka-consumer-group-id, {} or \"group_id\" in the config file",
                    ENV_GROUP_ID
                ))
            })?,
            topics: merged.topics.ok_or_else(|| {
                Error::config(format!(
                    "Kafka topics missing: set --kafka-topics-csv, {} or \"topics\" in the config file",
                    ENV_TOPICS
                ))
            })?,
        };
        config.validate()?;
        Ok(config)
    }
}

/// One layer of [`KafkaConfig`]: every field optional so layers can be
/// merged field-wise. This is also the schema of the JSON config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialKafkaConfig {
    /// Broker addresses, if this layer provides them.
    pub brokers: Option<Vec<String>>,
    /// Consumer group id, if this layer provides it.
    pub group_id: Option<String>,
    /// Topic names, if this layer provides them.
    pub topics: Option<Vec<String>>,
}

impl PartialKafkaConfig {
    /// Reads the environment layer (`KAFKA_BOOTSTRAP_SERVERS`,
    /// `KAFKA_CONSUMER_GROUP_ID`, `KAFKA_TOPICS`). Blank values count as
    /// absent so an empty export does not shadow a lower layer.
    pub fn from_env() -> Self {
        Self {
            brokers: std::env::var(ENV_BROKERS).ok().map(|v| split_csv(&v)).filter(|v| !v.is_empty()),
            group_id: std::env::var(ENV_GROUP_ID).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty()),
            topics: std::env::var(ENV_TOPICS).ok().map(|v| split_csv(&v)).filter(|v| !v.is_empty()),
        }
    }

    /// Reads the file layer from a JSON document with the same field names.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Field-wise merge: keeps `self` where set, falls back to `lower`.
    pub fn or(self, lower: Self) -> Self {
        Self {
            brokers: self.brokers.or(lower.brokers),
            group_id: self.group_id.or(lower.group_id),
            topics: self.topics.or(lower.topics),
        }
    }
}

/// Splits a comma-separated value, dropping blanks.
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// The two knobs that decide whether observed lag is acceptable.
///
/// `max_allowed_delay_ms` doubles as the staleness lookback window: a
/// partition with outstanding lag and no write inside the last
/// `max_allowed_delay_ms` milliseconds is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthThresholds {
    /// Maximum number of events the group may lag behind a partition's
    /// high watermark. Must be greater than 1.
    pub max_allowed_lag_events: i64,
    /// Lookback window in milliseconds for the staleness probe. Must be at
    /// least 10 seconds; anything shorter flags ordinary commit cadence.
    pub max_allowed_delay_ms: i64,
}

impl HealthThresholds {
    /// Builds validated thresholds. Invalid values are a startup error and
    /// never reach the verdict machinery.
    pub fn new(max_allowed_lag_events: i64, max_allowed_delay_ms: i64) -> Result<Self> {
        let thresholds = Self {
            max_allowed_lag_events,
            max_allowed_delay_ms,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Validates the threshold values.
    pub fn validate(&self) -> Result<()> {
        if self.max_allowed_lag_events <= 1 {
            return Err(Error::config(format!(
                "max_allowed_lag_events must be greater than 1, got {}",
                self.max_allowed_lag_events
            )));
        }
        if self.max_allowed_delay_ms < 10_000 {
            return Err(Error::config(format!(
                "max_allowed_delay_ms must be at least 10000, got {}",
                self.max_allowed_delay_ms
            )));
        }
        Ok(())
    }
}

/// Tuning for one health-check pass: broker call timeouts, the concurrency
/// bound for per-partition queries, and the overall deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Timeout for each per-topic metadata query.
    pub metadata_timeout: Duration,
    /// Timeout for each per-partition offset query.
    pub query_timeout: Duration,
    /// How many partitions are sampled concurrently.
    pub max_in_flight: usize,
    /// Overall deadline for the pass. `None` derives a sum-bound from the
    /// partition count and concurrency level.
    pub overall_deadline: Option<Duration>,
}

impl CheckConfig {
    /// Validates the tuning values.
    pub fn validate(&self) -> Result<()> {
        if self.max_in_flight == 0 {
            return Err(Error::config("max_in_flight must be at least 1."));
        }
        if self.query_timeout < Duration::from_millis(100)
            || self.metadata_timeout < Duration::from_millis(100)
        {
            return Err(Error::config("broker call timeouts must be at least 100ms."));
        }
        Ok(())
    }

    /// The deadline for a pass over `partition_count` partitions: the
    /// configured override, or twice the per-partition timeout per
    /// concurrency wave, capped at two minutes. The cap keeps the process
    /// from hanging when the broker accepts connections but answers nothing.
    pub fn deadline_for(&self, partition_count: usize) -> Duration {
        if let Some(deadline) = self.overall_deadline {
            return deadline;
        }
        let waves = partition_count.div_ceil(self.max_in_flight).max(1) as u32;
        (self.query_timeout * 2 * waves).min(Duration::from_secs(120))
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            metadata_timeout: Duration::from_secs(10),
            query_timeout: Duration::from_secs(10),
            max_in_flight: 8,
            overall_deadline: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_kafka_config() -> KafkaConfig {
        KafkaConfig {
            brokers: vec!["broker-1:9092".to_string()],
            group_id: "orders-processor".to_string(),
            topics: vec!["orders".to_string()],
        }
    }

    #[test]
    fn kafka_config_validation_rules() {
        assert!(valid_kafka_config().validate().is_ok());

        let mut cfg = valid_kafka_config();
        cfg.brokers = vec![];
        assert!(matches!(cfg.validate(), Err(Error::Config(msg)) if msg.contains("brokers")));

        let mut cfg = valid_kafka_config();
        cfg.group_id = "  ".to_string();
        assert!(matches!(cfg.validate(), Err(Error::Config(msg)) if msg.contains("group_id")));

        let mut cfg = valid_kafka_config();
        cfg.topics = vec![];
        assert!(matches!(cfg.validate(), Err(Error::Config(msg)) if msg.contains("topics")));
    }

    #[test]
    fn thresholds_boundaries() {
        // 2 events and 10s are the smallest legal values.
        assert!(HealthThresholds::new(2, 10_000).is_ok());
        assert!(matches!(
            HealthThresholds::new(1, 10_000),
            Err(Error::Config(msg)) if msg.contains("max_allowed_lag_events")
        ));
        assert!(matches!(
            HealthThresholds::new(2, 9_999),
            Err(Error::Config(msg)) if msg.contains("max_allowed_delay_ms")
        ));
        assert!(matches!(
            HealthThresholds::new(0, 0),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn partial_merge_prefers_upper_layer() {
        let flags = PartialKafkaConfig {
            brokers: Some(vec!["flag-broker:9092".to_string()]),
            group_id: None,
            topics: None,
        };
        let lower = PartialKafkaConfig {
            brokers: Some(vec!["file-broker:9092".to_string()]),
            group_id: Some("file-group".to_string()),
            topics: Some(vec!["file-topic".to_string()]),
        };
        let merged = flags.or(lower);
        assert_eq!(merged.brokers.unwrap(), vec!["flag-broker:9092".to_string()]);
        assert_eq!(merged.group_id.unwrap(), "file-group");
        assert_eq!(merged.topics.unwrap(), vec!["file-topic".to_string()]);
    }

    #[test]
    fn split_csv_drops_blanks() {
        assert_eq!(split_csv("a, b ,,c"), vec!["a", "b", "c"]);
        assert!(split_csv("  ").is_empty());
    }

    #[test]
    fn check_config_deadline_scales_with_waves() {
        let cfg = CheckConfig {
            query_timeout: Duration::from_secs(10),
            max_in_flight: 8,
            ..CheckConfig::default()
        };
        // One wave of 8 partitions: 2 * 10s.
        assert_eq!(cfg.deadline_for(8), Duration::from_secs(20));
        // Nine partitions need two waves.
        assert_eq!(cfg.deadline_for(9), Duration::from_secs(40));
        // Capped at two minutes regardless of partition count.
        assert_eq!(cfg.deadline_for(10_000), Duration::from_secs(120));
        // Explicit override wins.
        let cfg = CheckConfig {
            overall_deadline: Some(Duration::from_secs(5)),
            ..cfg
        };
        assert_eq!(cfg.deadline_for(10_000), Duration::from_secs(5));
    }
}
