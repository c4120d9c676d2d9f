//! The health-check core: partition location, offset sampling, staleness
//! probing, per-partition verdicts and the aggregated report.
//!
//! Everything in this module is created fresh for a single pass and
//! discarded afterwards; the only state that persists between invocations
//! is whatever the broker itself retains.

/// Committed-offset and high-watermark sampling per partition.
pub mod offsets;
/// Partition identity and metadata-based partition location.
pub mod partitions;
/// The aggregated report consumed by the CLI boundary.
pub mod report;
/// Time-indexed activity probing per partition.
pub mod staleness;
/// The pure per-partition classification rules.
pub mod verdict;

pub use offsets::{OffsetSampler, PartitionOffsetSnapshot};
pub use partitions::{PartitionLocator, TopicPartition};
pub use report::{aggregate, HealthReport, OverallHealth, PartitionHealth};
pub use staleness::{StalenessProbe, StalenessSample};
pub use verdict::{evaluate, PartitionVerdict};

use crate::client::LagwatchClient;
use crate::config::{CheckConfig, HealthThresholds};
use crate::error::Result;
use futures::stream::{self, StreamExt};
use tokio::task::spawn_blocking;
use tokio::time::timeout_at;
use tracing::{error, info, warn};

/// Drives one health-check pass over a consumer group.
///
/// Control flow: locator resolves the partition set, then every partition
/// is sampled and probed concurrently (bounded by
/// [`CheckConfig::max_in_flight`]), each query under its own timeout and
/// the whole pass under a global deadline. Partition-local failures degrade
/// only that partition's verdict to `Unknown`; the aggregator waits for the
/// full set before folding, so one slow partition cannot erase the signal
/// from the others.
pub struct HealthCheck {
    client: LagwatchClient,
    topics: Vec<String>,
    thresholds: HealthThresholds,
    config: CheckConfig,
}

impl HealthCheck {
    /// Builds a pass runner. Thresholds and tuning are validated here, once,
    /// so invalid values surface at startup rather than mid-pass.
    pub fn new(
        client: LagwatchClient,
        topics: Vec<String>,
        thresholds: HealthThresholds,
        config: CheckConfig,
    ) -> Result<Self> {
        thresholds.validate()?;
        config.validate()?;
        Ok(Self {
            client,
            topics,
            thresholds,
            config,
        })
    }

    /// Runs one pass at the given wall-clock time (unix milliseconds,
    /// injected for testability) and returns the report.
    ///
    /// Fails only on locator-level errors; every per-partition failure is
    /// absorbed into that partition's `Unknown` verdict.
    pub async fn run(&self, now_ms: i64) -> Result<HealthReport> {
        let locator = PartitionLocator::new(&self.client, self.config.metadata_timeout);
        let topics = self.topics.clone();
        let partitions = spawn_blocking(move || locator.locate(&topics)).await??;
        info!(partitions = partitions.len(), "resolved partition set");

        let lookback_ms = self.thresholds.max_allowed_delay_ms;
        let query_timeout = self.config.query_timeout;
        let deadline = tokio::time::Instant::now() + self.config.deadline_for(partitions.len());

        let entries: Vec<PartitionHealth> = stream::iter(partitions)
            .map(|tp| {
                let sampler = OffsetSampler::new(&self.client, query_timeout);
                let probe = StalenessProbe::new(&self.client, query_timeout);
                let thresholds = self.thresholds;
                async move {
                    let task_tp = tp.clone();
                    let joined = timeout_at(
                        deadline,
                        spawn_blocking(move || {
                            let snapshot = sampler.sample(&task_tp);
                            let staleness = probe.probe(&task_tp, lookback_ms, now_ms);
                            (snapshot, staleness)
                        }),
                    )
                    .await;

                    let (snapshot, staleness) = match joined {
                        Ok(Ok((snapshot, staleness))) => {
                            (ok_or_warn(&tp, snapshot), ok_or_warn(&tp, staleness))
                        }
                        Ok(Err(join_error)) => {
                            warn!(partition = %tp, error = %join_error, "partition query task failed");
                            (None, None)
                        }
                        Err(_elapsed) => {
                            warn!(partition = %tp, "partition query cancelled by overall deadline");
                            (None, None)
                        }
                    };

                    let verdict = evaluate(snapshot.as_ref(), staleness.as_ref(), &thresholds);
                    info!(
                        topic = %tp.topic,
                        partition = tp.partition,
                        committed = ?snapshot.as_ref().and_then(|s| s.committed),
                        high_watermark = ?snapshot.as_ref().map(|s| s.high_watermark),
                        lag = ?snapshot.as_ref().and_then(PartitionOffsetSnapshot::lag),
                        verdict = %verdict,
                        "partition checked"
                    );
                    PartitionHealth::from_snapshot(tp, snapshot.as_ref(), verdict)
                }
            })
            .buffered(self.config.max_in_flight)
            .collect()
            .await;

        let report = aggregate(entries);
        match report.overall {
            OverallHealth::Healthy => info!(overall = %report.overall, "consumer group healthy"),
            OverallHealth::Indeterminate => {
                warn!(overall = %report.overall, "health could not be fully assessed")
            }
            OverallHealth::Unhealthy => error!(overall = %report.overall, "consumer group unhealthy"),
        }
        Ok(report)
    }
}

/// Absorbs a partition-local query failure into `None`, logging it once.
fn ok_or_warn<T>(partition: &TopicPartition, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(partition = %partition, error = %e, "partition query failed, verdict degrades to unknown");
            None
        }
    }
}
