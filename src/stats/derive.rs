//! Normalization of a raw stats snapshot into published metric values.
//!
//! [`derive`] is a pure function of its input: the same snapshot always
//! yields the same [`DerivedMetrics`]. Missing or malformed counter
//! families never abort normalization; the affected fields fall back to
//! their documented defaults instead.
//!
//! # Defaults
//!
//! - CPU ratio: 0 when either reading is missing or the system-time delta
//!   is not positive (the very first sample, or a clock anomaly).
//! - Memory usage/RSS/limit: 0 when absent; usage ratio 0 when limit is 0.
//! - Block I/O totals: 0 when the entry list is absent.
//! - Network totals: omitted (`None`) when neither the bridge interface
//!   (`eth0`) nor the host-mode pseudo-interface (`host`) is reported —
//!   a missing series and a zero series mean different things to a
//!   consumer, and only for network can "no data" be told apart from
//!   "no traffic".

use super::{CpuStats, StatsSnapshot};

/// Interface looked up first: the default bridge network adapter.
const BRIDGE_INTERFACE: &str = "eth0";
/// Fallback interface reported for containers in host network mode.
const HOST_INTERFACE: &str = "host";

/// The normalized metric values for one container for one pass.
///
/// Ratios are percentages in `0..=100` per CPU (CPU usage may exceed 100
/// on multi-core hosts), rounded to two decimals. All values are finite
/// and non-negative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedMetrics {
    pub cpu_usage_ratio: f64,
    pub memory_usage_bytes: u64,
    pub memory_usage_rss_bytes: u64,
    pub memory_limit_bytes: u64,
    pub memory_usage_ratio: f64,
    pub network: Option<NetworkTotals>,
    pub blkio_read_bytes: u64,
    pub blkio_written_bytes: u64,
}

/// Network byte totals for the container's reporting interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkTotals {
    pub received_bytes: u64,
    pub transmitted_bytes: u64,
}

/// Computes the derived metric set for one snapshot.
pub fn derive(snapshot: &StatsSnapshot) -> DerivedMetrics {
    let (memory_usage_bytes, memory_usage_rss_bytes, memory_limit_bytes) =
        match &snapshot.memory_stats {
            Some(memory) => (
                memory.usage.unwrap_or(0),
                memory.rss(),
                memory.limit.unwrap_or(0),
            ),
            None => (0, 0, 0),
        };
    let memory_usage_ratio = if memory_limit_bytes > 0 {
        round2(memory_usage_bytes as f64 / memory_limit_bytes as f64 * 100.0)
    } else {
        0.0
    };

    let network = snapshot.networks.as_ref().and_then(|interfaces| {
        interfaces
            .get(BRIDGE_INTERFACE)
            .or_else(|| interfaces.get(HOST_INTERFACE))
            .map(|interface| NetworkTotals {
                received_bytes: interface.rx_bytes,
                transmitted_bytes: interface.tx_bytes,
            })
    });

    let (blkio_read_bytes, blkio_written_bytes) = match &snapshot.blkio_stats {
        Some(blkio) => (blkio.total_for_op("read"), blkio.total_for_op("write")),
        None => (0, 0),
    };

    DerivedMetrics {
        cpu_usage_ratio: cpu_usage_ratio(
            snapshot.cpu_stats.as_ref(),
            snapshot.precpu_stats.as_ref(),
        ),
        memory_usage_bytes,
        memory_usage_rss_bytes,
        memory_limit_bytes,
        memory_usage_ratio,
        network,
        blkio_read_bytes,
        blkio_written_bytes,
    }
}

/// CPU usage as a percentage, from the deltas of the two readings.
///
/// Counters are cumulative, so both deltas saturate at 0 to guard against
/// daemon restarts and clock anomalies; a non-positive system delta
/// defines the ratio as 0.
fn cpu_usage_ratio(current: Option<&CpuStats>, previous: Option<&CpuStats>) -> f64 {
    let (Some(current), Some(previous)) = (current, previous) else {
        return 0.0;
    };

    let system_delta = current
        .system_cpu_usage
        .unwrap_or(0)
        .saturating_sub(previous.system_cpu_usage.unwrap_or(0));
    if system_delta == 0 {
        return 0.0;
    }

    let cpu_delta = current.total_usage().saturating_sub(previous.total_usage());
    round2(cpu_delta as f64 / system_delta as f64 * current.cpu_count() as f64 * 100.0)
}

/// Rounds to two decimal places, half away from zero.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
