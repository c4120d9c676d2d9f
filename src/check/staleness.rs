use crate::check::offsets::concrete_offset;
use crate::check::partitions::TopicPartition;
use crate::client::LagwatchClient;
use crate::error::{Error, Result};
use rdkafka::consumer::{BaseConsumer, Consumer};
use rdkafka::{Offset, TopicPartitionList};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Result of asking the broker for the earliest offset at or after
/// `now - lookback`: whether anything was written to the partition inside
/// the lookback window.
///
/// `offset_at_window_start == None` covers both an idle partition and a
/// window that predates retained data; the broker cannot tell them apart
/// and neither can the evaluator, so both read as "no recent write".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StalenessSample {
    /// The partition this sample belongs to.
    pub partition: TopicPartition,
    /// The lookback window that was queried, in milliseconds.
    pub lookback_ms: i64,
    /// The earliest offset at or after the window start, if any record
    /// exists there.
    pub offset_at_window_start: Option<i64>,
}

impl StalenessSample {
    /// True when at least one record was written inside the window.
    pub fn active_in_window(&self) -> bool {
        self.offset_at_window_start.is_some()
    }
}

/// Resolves per-partition in-window activity via the broker's time-indexed
/// offset lookup.
///
/// Failures here are partition-local, same as [`super::offsets::OffsetSampler`].
pub struct StalenessProbe {
    consumer: Arc<BaseConsumer>,
    timeout: Duration,
}

impl StalenessProbe {
    /// Creates a probe over the client's shared consumer.
    pub fn new(client: &LagwatchClient, timeout: Duration) -> Self {
        Self {
            consumer: client.consumer(),
            timeout,
        }
    }

    /// Probes one partition for activity inside the trailing
    /// `lookback_ms` window ending at `now_ms`.
    ///
    /// Failure maps to [`Error::TimeLookup`] for this partition alone.
    pub fn probe(
        &self,
        partition: &TopicPartition,
        lookback_ms: i64,
        now_ms: i64,
    ) -> Result<StalenessSample> {
        let window_start_ms = now_ms - lookback_ms;

        let mut query = TopicPartitionList::new();
        query
            .add_partition_offset(
                &partition.topic,
                partition.partition,
                Offset::Offset(window_start_ms),
            )
            .map_err(|e| Error::time_lookup(partition, e))?;

        let resolved = self
            .consumer
            .offsets_for_times(query, self.timeout)
            .map_err(|e| Error::time_lookup(partition, e))?;
        let offset_at_window_start = resolved
            .find_partition(&partition.topic, partition.partition)
            .and_then(|elem| concrete_offset(elem.offset()));

        trace!(
            partition = %partition,
            window_start_ms,
            offset_at_window_start = ?offset_at_window_start,
            "probed partition staleness"
        );
        Ok(StalenessSample {
            partition: partition.clone(),
            lookback_ms,
            offset_at_window_start,
        })
    }
}
