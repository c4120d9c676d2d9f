use crate::check::offsets::PartitionOffsetSnapshot;
use crate::check::partitions::TopicPartition;
use crate::check::verdict::PartitionVerdict;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One partition's line in the final report: its verdict plus the offsets
/// that were actually observed, so the CLI boundary can print diagnostics
/// without re-querying the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionHealth {
    /// The partition this entry describes.
    pub partition: TopicPartition,
    /// The group's committed offset, if the query succeeded and a commit exists.
    pub committed: Option<i64>,
    /// The partition's high watermark, if the query succeeded.
    pub high_watermark: Option<i64>,
    /// Computed lag, if both offsets were known.
    pub lag: Option<i64>,
    /// The verdict for this partition.
    pub verdict: PartitionVerdict,
}

impl PartitionHealth {
    /// Builds an entry from an optional snapshot (absent when the upstream
    /// query failed) and the evaluated verdict.
    pub fn from_snapshot(
        partition: TopicPartition,
        snapshot: Option<&PartitionOffsetSnapshot>,
        verdict: PartitionVerdict,
    ) -> Self {
        Self {
            partition,
            committed: snapshot.and_then(|s| s.committed),
            high_watermark: snapshot.map(|s| s.high_watermark),
            lag: snapshot.and_then(PartitionOffsetSnapshot::lag),
            verdict,
        }
    }
}

/// Overall verdict for one health-check pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallHealth {
    /// Every partition verdict is `Healthy`.
    Healthy,
    /// At least one partition is `LagExceeded` or `Stale`.
    Unhealthy,
    /// No partition is unhealthy but at least one is `Unknown`.
    Indeterminate,
}

impl OverallHealth {
    /// Process exit status for this verdict. `Indeterminate` gets its own
    /// code so callers can tell "the group is behind" from "the check could
    /// not see everything".
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Healthy => 0,
            Self::Unhealthy => 1,
            Self::Indeterminate => 2,
        }
    }
}

impl fmt::Display for OverallHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
            Self::Indeterminate => "indeterminate",
        };
        f.write_str(name)
    }
}

/// The product of one health-check pass. Created once per invocation,
/// immutable afterwards, ordered as the locator produced partitions so
/// repeated runs against unchanged broker state are reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Per-partition entries, in locator order.
    pub partitions: Vec<PartitionHealth>,
    /// The folded overall verdict.
    pub overall: OverallHealth,
}

/// Folds per-partition entries into the final report. Any unhealthy
/// partition makes the pass `Unhealthy`; otherwise any `Unknown` makes it
/// `Indeterminate`; only a fully healthy set is `Healthy`. Entry order is
/// preserved.
pub fn aggregate(partitions: Vec<PartitionHealth>) -> HealthReport {
    let mut overall = OverallHealth::Healthy;
    for entry in &partitions {
        if entry.verdict.is_unhealthy() {
            overall = OverallHealth::Unhealthy;
            break;
        }
        if entry.verdict == PartitionVerdict::Unknown {
            overall = OverallHealth::Indeterminate;
        }
    }
    HealthReport { partitions, overall }
}
