use crate::client::LagwatchClient;
use crate::error::{Error, Result};
use rdkafka::consumer::{BaseConsumer, Consumer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Immutable identity of one partition of one topic. Unique per
/// `(topic, partition)` pair and used as the key for every per-partition
/// result in a pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TopicPartition {
    /// The topic name.
    pub topic: String,
    /// The partition id within the topic.
    pub partition: i32,
}

impl TopicPartition {
    /// Creates a new identity key.
    pub fn new(topic: impl Into<String>, partition: i32) -> Self {
        Self {
            topic: topic.into(),
            partition,
        }
    }
}

impl fmt::Display for TopicPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.topic, self.partition)
    }
}

/// Resolves the partitions belonging to the topics under test from broker
/// metadata.
///
/// Locator failures abort the whole pass: without a partition set there is
/// nothing to produce verdicts for.
pub struct PartitionLocator {
    consumer: Arc<BaseConsumer>,
    timeout: Duration,
}

impl PartitionLocator {
    /// Creates a locator over the client's shared consumer.
    pub fn new(client: &LagwatchClient, timeout: Duration) -> Self {
        Self {
            consumer: client.consumer(),
            timeout,
        }
    }

    /// Resolves every partition of `topics`, in a stable order: topics in
    /// the order given, partitions ascending by id.
    ///
    /// Fails with [`Error::TopicNotFound`] when metadata omits a topic (or
    /// the broker reports a topic-level error) and with
    /// [`Error::EmptyPartitionSet`] when a topic has zero partitions.
    pub fn locate(&self, topics: &[String]) -> Result<Vec<TopicPartition>> {
        let mut located = Vec::new();
        for topic in topics {
            let metadata = self.consumer.fetch_metadata(Some(topic), self.timeout)?;
            let topic_metadata = metadata
                .topics()
                .iter()
                .find(|t| t.name() == topic)
                .ok_or_else(|| Error::TopicNotFound {
                    topic: topic.clone(),
                })?;
            if topic_metadata.error().is_some() {
                return Err(Error::TopicNotFound {
                    topic: topic.clone(),
                });
            }

            let mut partition_ids: Vec<i32> = topic_metadata
                .partitions()
                .iter()
                .map(|p| p.id())
                .collect();
            if partition_ids.is_empty() {
                return Err(Error::EmptyPartitionSet {
                    topic: topic.clone(),
                });
            }
            partition_ids.sort_unstable();

            debug!(topic = %topic, partitions = partition_ids.len(), "resolved topic partitions");
            located.extend(
                partition_ids
                    .into_iter()
                    .map(|id| TopicPartition::new(topic.clone(), id)),
            );
        }
        Ok(located)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_topic_and_id() {
        let tp = TopicPartition::new("orders", 3);
        assert_eq!(tp.to_string(), "orders[3]");
    }

    #[test]
    fn identity_orders_by_topic_then_partition() {
        let mut tps = vec![
            TopicPartition::new("orders", 1),
            TopicPartition::new("billing", 2),
            TopicPartition::new("orders", 0),
        ];
        tps.sort();
        assert_eq!(
            tps,
            vec![
                TopicPartition::new("billing", 2),
                TopicPartition::new("orders", 0),
                TopicPartition::new("orders", 1),
            ]
        );
    }
}
