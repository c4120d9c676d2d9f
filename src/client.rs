use crate::config::KafkaConfig;
use crate::error::Result;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::BaseConsumer;
use std::sync::Arc;
use tracing::debug;

/// Owns the shared, group-scoped broker connection used by the locator,
/// sampler and probe.
///
/// The consumer never subscribes and never commits: it exists only to issue
/// metadata, committed-offset, watermark and time-lookup queries on behalf
/// of the group named in the configuration. rdkafka's own thread safety is
/// the only locking discipline the read-only queries need.
pub struct LagwatchClient {
    consumer: Arc<BaseConsumer>,
}

impl LagwatchClient {
    /// Builds the client from a validated [`KafkaConfig`].
    pub fn new(config: &KafkaConfig) -> Result<Self> {
        let consumer: BaseConsumer = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "false")
            .set("socket.timeout.ms", "10000")
            .create()?;
        debug!(
            brokers = %config.brokers.join(","),
            group_id = %config.group_id,
            "created health-check consumer"
        );
        Ok(Self {
            consumer: Arc::new(consumer),
        })
    }

    /// Hands out the shared consumer for query components.
    pub(crate) fn consumer(&self) -> Arc<BaseConsumer> {
        Arc::clone(&self.consumer)
    }
}
