use crate::check::partitions::TopicPartition;
use crate::client::LagwatchClient;
use crate::error::{Error, Result};
use rdkafka::consumer::{BaseConsumer, Consumer};
use rdkafka::{Offset, TopicPartitionList};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// One partition's offset state at a single instant: the group's committed
/// offset and the partition's high watermark.
///
/// `committed` is `None` when the group has never committed on this
/// partition. Zero is a legitimate offset and must not stand in for "no
/// commit".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionOffsetSnapshot {
    /// The partition this snapshot belongs to.
    pub partition: TopicPartition,
    /// The group's committed offset, absent if the group never committed.
    pub committed: Option<i64>,
    /// The offset immediately after the last durably written record.
    pub high_watermark: i64,
    /// Unix milliseconds at which the snapshot was taken.
    pub sampled_at_ms: i64,
}

impl PartitionOffsetSnapshot {
    /// Events produced but not yet consumed. `None` while the group has no
    /// commit to measure from. Callers must treat a negative value as an
    /// invariant violation, not as zero lag.
    pub fn lag(&self) -> Option<i64> {
        self.committed.map(|committed| self.high_watermark - committed)
    }
}

/// Retrieves committed offsets and high watermarks for single partitions.
///
/// Failures here are partition-local: the orchestrator degrades only the
/// affected partition's verdict to `Unknown` and the pass continues.
pub struct OffsetSampler {
    consumer: Arc<BaseConsumer>,
    timeout: Duration,
}

impl OffsetSampler {
    /// Creates a sampler over the client's shared consumer.
    pub fn new(client: &LagwatchClient, timeout: Duration) -> Self {
        Self {
            consumer: client.consumer(),
            timeout,
        }
    }

    /// Samples one partition's committed offset and high watermark.
    ///
    /// Both queries carry this sampler's timeout; either failing maps to
    /// [`Error::WatermarkQuery`] for this partition alone.
    pub fn sample(&self, partition: &TopicPartition) -> Result<PartitionOffsetSnapshot> {
        let mut assignment = TopicPartitionList::new();
        assignment.add_partition(&partition.topic, partition.partition);

        let committed_list = self
            .consumer
            .committed_offsets(assignment, self.timeout)
            .map_err(|e| Error::watermark_query(partition, e))?;
        let committed = committed_list
            .find_partition(&partition.topic, partition.partition)
            .and_then(|elem| concrete_offset(elem.offset()));

        let (_low, high_watermark) = self
            .consumer
            .fetch_watermarks(&partition.topic, partition.partition, self.timeout)
            .map_err(|e| Error::watermark_query(partition, e))?;

        trace!(
            partition = %partition,
            committed = ?committed,
            high_watermark,
            "sampled partition offsets"
        );
        Ok(PartitionOffsetSnapshot {
            partition: partition.clone(),
            committed,
            high_watermark,
            sampled_at_ms: chrono::Utc::now().timestamp_millis(),
        })
    }
}

/// Maps an rdkafka offset to a concrete value. The broker's sentinels
/// (invalid, end, stored) all mean "no concrete offset here".
pub(crate) fn concrete_offset(offset: Offset) -> Option<i64> {
    match offset {
        Offset::Offset(value) if value >= 0 => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(committed: Option<i64>, high_watermark: i64) -> PartitionOffsetSnapshot {
        PartitionOffsetSnapshot {
            partition: TopicPartition::new("orders", 0),
            committed,
            high_watermark,
            sampled_at_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn lag_is_watermark_minus_committed() {
        assert_eq!(snapshot(Some(100), 5000).lag(), Some(4900));
        assert_eq!(snapshot(Some(50), 50).lag(), Some(0));
    }

    #[test]
    fn lag_unknown_without_commit() {
        assert_eq!(snapshot(None, 5000).lag(), None);
    }

    #[test]
    fn committed_zero_is_a_real_offset() {
        // A group that committed offset 0 has a measurable lag.
        assert_eq!(snapshot(Some(0), 10).lag(), Some(10));
    }

    #[test]
    fn sentinel_offsets_are_not_concrete() {
        assert_eq!(concrete_offset(Offset::Offset(42)), Some(42));
        assert_eq!(concrete_offset(Offset::Offset(0)), Some(0));
        assert_eq!(concrete_offset(Offset::Invalid), None);
        assert_eq!(concrete_offset(Offset::End), None);
        assert_eq!(concrete_offset(Offset::Beginning), None);
        assert_eq!(concrete_offset(Offset::Offset(-1)), None);
    }
}
