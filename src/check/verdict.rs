use crate::check::offsets::PartitionOffsetSnapshot;
use crate::check::staleness::StalenessSample;
use crate::config::HealthThresholds;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Health classification of a single partition, computed independently of
/// every other partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionVerdict {
    /// Lag within threshold and no stale silence.
    Healthy,
    /// Lag exceeds the configured maximum.
    LagExceeded,
    /// Outstanding lag (or no commit at all) combined with no write inside
    /// the lookback window.
    Stale,
    /// An upstream query for this partition failed; nothing can be said.
    Unknown,
}

impl PartitionVerdict {
    /// True for the verdicts that make the overall pass unhealthy.
    pub fn is_unhealthy(self) -> bool {
        matches!(self, Self::LagExceeded | Self::Stale)
    }
}

impl fmt::Display for PartitionVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Healthy => "healthy",
            Self::LagExceeded => "lag-exceeded",
            Self::Stale => "stale",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Classifies one partition from its offset snapshot and staleness sample.
///
/// `None` inputs represent failed upstream queries. Decision order, first
/// match wins:
///
/// 1. Either input unknown: `Unknown`. An unreachable broker dominates all
///    other signals.
/// 2. The group never committed and nothing was written in-window: `Stale`.
///    A brand-new idle partition is not vacuously healthy.
/// 3. Lag over threshold: `LagExceeded`. A negative computed lag violates
///    the snapshot invariant and yields `Unknown`, never `Healthy`.
/// 4. Nonzero lag and nothing written in-window: `Stale`. Lag of exactly
///    zero with silence is healthy, the consumer is simply caught up.
/// 5. Otherwise: `Healthy`.
///
/// Pure and synchronous: the same inputs produce the same verdict on every
/// call.
pub fn evaluate(
    snapshot: Option<&PartitionOffsetSnapshot>,
    staleness: Option<&StalenessSample>,
    thresholds: &HealthThresholds,
) -> PartitionVerdict {
    let (snapshot, staleness) = match (snapshot, staleness) {
        (Some(snapshot), Some(staleness)) => (snapshot, staleness),
        _ => return PartitionVerdict::Unknown,
    };

    if snapshot.committed.is_none() && !staleness.active_in_window() {
        return PartitionVerdict::Stale;
    }

    if let Some(lag) = snapshot.lag() {
        if lag < 0 {
            return PartitionVerdict::Unknown;
        }
        if lag > thresholds.max_allowed_lag_events {
            return PartitionVerdict::LagExceeded;
        }
        if lag > 0 && !staleness.active_in_window() {
            return PartitionVerdict::Stale;
        }
    }

    PartitionVerdict::Healthy
}
