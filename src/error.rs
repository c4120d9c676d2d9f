use thiserror::Error;

/// Crate result type, wrapping the crate's [`Error`] enum.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types, split between failures that abort a whole health-check pass
/// and failures that degrade a single partition's verdict.
///
/// `Config`, `TopicNotFound` and `EmptyPartitionSet` are fatal: without a
/// validated configuration and a resolved partition set no verdict can be
/// produced at all. `WatermarkQuery` and `TimeLookup` are partition-local:
/// the orchestrator maps them to an `Unknown` verdict for that partition and
/// the pass continues.
#[derive(Error, Debug)]
pub enum Error {
    /// Errors originating from the underlying `rdkafka` library (e.g., connection, protocol issues).
    #[error("Kafka client error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// Invalid configuration (thresholds, broker lists, missing fields). Always a startup error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Broker metadata does not know the topic under test.
    #[error("topic '{topic}' not found in broker metadata")]
    TopicNotFound {
        /// The topic that was requested.
        topic: String,
    },

    /// A topic resolved to zero partitions. Always a misconfiguration, never a healthy empty state.
    #[error("topic '{topic}' resolved to an empty partition set")]
    EmptyPartitionSet {
        /// The topic that resolved empty.
        topic: String,
    },

    /// The committed-offset or high-watermark query failed for one partition.
    #[error("watermark query failed for {partition}: {source}")]
    WatermarkQuery {
        /// The partition whose sampling failed, as `topic[partition]`.
        partition: String,
        #[source]
        /// The underlying Kafka error.
        source: rdkafka::error::KafkaError,
    },

    /// The time-indexed offset lookup failed for one partition.
    #[error("time-indexed offset lookup failed for {partition}: {source}")]
    TimeLookup {
        /// The partition whose lookup failed, as `topic[partition]`.
        partition: String,
        #[source]
        /// The underlying Kafka error.
        source: rdkafka::error::KafkaError,
    },

    /// Best-effort topic creation failed for a reason other than the topic already existing.
    #[error("topic creation failed for '{topic}': {reason}")]
    TopicCreate {
        /// The topic that could not be created.
        topic: String,
        /// The broker's error code, rendered.
        reason: String,
    },

    /// Errors related to standard I/O operations (e.g., reading a JSON config file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failures outside the categories above (e.g., a panicked worker task).
    #[error("An unexpected error occurred: {0}")]
    Other(String),
}

impl Error {
    /// Creates a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a partition-local WatermarkQuery error.
    pub(crate) fn watermark_query(
        partition: impl std::fmt::Display,
        source: rdkafka::error::KafkaError,
    ) -> Self {
        Self::WatermarkQuery {
            partition: partition.to_string(),
            source,
        }
    }

    /// Creates a partition-local TimeLookup error.
    pub(crate) fn time_lookup(
        partition: impl std::fmt::Display,
        source: rdkafka::error::KafkaError,
    ) -> Self {
        Self::TimeLookup {
            partition: partition.to_string(),
            source,
        }
    }

    /// True when the error only degrades a single partition instead of aborting the pass.
    pub fn is_partition_local(&self) -> bool {
        matches!(self, Self::WatermarkQuery { .. } | Self::TimeLookup { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON config parse error: {}", err))
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Other(format!("Task join error: {}", err))
    }
}
