//! The raw per-container stats snapshot as reported by the Docker daemon.
//!
//! The daemon's stats payload is a loosely-structured tree: depending on
//! cgroup version, network mode, and how recently the container started,
//! whole substructures may be missing or empty. This module models the
//! payload accordingly — every counter family is optional, every leaf
//! inside a family has an explicit default — so a partial payload
//! deserializes instead of failing.
//!
//! # Main types
//!
//! - [`StatsSnapshot`]: one decoded point-in-time payload for one container.
//! - [`derive::DerivedMetrics`]: the normalized output computed from it.
//!
//! A malformed substructure (wrong shape rather than merely absent) is
//! dropped field-by-field: the snapshot keeps every family that did parse.

mod blkio;
mod cpu;
pub mod derive;
mod memory;
mod net;

pub use blkio::{BlkioEntry, BlkioStats};
pub use cpu::{CpuStats, CpuUsage};
pub use derive::{DerivedMetrics, NetworkTotals, derive};
pub use memory::MemoryStats;
pub use net::NetworkStats;

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// One point-in-time stats payload for one container.
///
/// `cpu_stats` carries the current reading, `precpu_stats` the daemon's
/// internal reading from roughly one tick earlier; their deltas drive the
/// CPU ratio. `networks` is keyed by interface name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSnapshot {
    pub id: Option<String>,
    pub name: Option<String>,
    pub cpu_stats: Option<CpuStats>,
    pub precpu_stats: Option<CpuStats>,
    pub memory_stats: Option<MemoryStats>,
    pub networks: Option<HashMap<String, NetworkStats>>,
    pub blkio_stats: Option<BlkioStats>,
}

impl StatsSnapshot {
    /// Decodes a snapshot from the raw response body.
    ///
    /// # Errors
    ///
    /// Fails only if the body is not valid JSON at all. Individual
    /// substructures of the wrong shape are dropped, not errors.
    pub fn from_json(body: &[u8]) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        Ok(Self::from_value(&value))
    }

    /// Extracts the snapshot from an already-parsed JSON tree.
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: field(value, "id"),
            name: field(value, "name"),
            cpu_stats: field(value, "cpu_stats"),
            precpu_stats: field(value, "precpu_stats"),
            memory_stats: field(value, "memory_stats"),
            networks: field(value, "networks"),
            blkio_stats: field(value, "blkio_stats"),
        }
    }
}

/// Tagged-optional lookup: absent key, `null`, or a value of the wrong
/// shape all come back as `None`.
fn field<T: DeserializeOwned>(value: &Value, key: &str) -> Option<T> {
    value
        .get(key)
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_snapshot() {
        let payload = json!({
            "id": "abc123",
            "name": "/web",
            "cpu_stats": {
                "cpu_usage": { "total_usage": 200 },
                "system_cpu_usage": 1100,
                "online_cpus": 4
            },
            "precpu_stats": {
                "cpu_usage": { "total_usage": 100 },
                "system_cpu_usage": 1000
            },
            "memory_stats": { "usage": 50_000_000u64, "limit": 100_000_000u64 },
            "networks": { "eth0": { "rx_bytes": 10, "tx_bytes": 20 } },
            "blkio_stats": {
                "io_service_bytes_recursive": [
                    { "op": "Read", "value": 100 },
                    { "op": "Write", "value": 50 }
                ]
            }
        });
        let snapshot = StatsSnapshot::from_value(&payload);

        assert_eq!(snapshot.id.as_deref(), Some("abc123"));
        assert_eq!(snapshot.name.as_deref(), Some("/web"));
        let cpu = snapshot.cpu_stats.unwrap();
        assert_eq!(cpu.cpu_usage.unwrap().total_usage, 200);
        assert_eq!(cpu.system_cpu_usage, Some(1100));
        assert_eq!(cpu.online_cpus, Some(4));
        let memory = snapshot.memory_stats.unwrap();
        assert_eq!(memory.usage, Some(50_000_000));
        assert_eq!(memory.limit, Some(100_000_000));
        assert_eq!(snapshot.networks.unwrap()["eth0"].rx_bytes, 10);
        assert_eq!(
            snapshot
                .blkio_stats
                .unwrap()
                .io_service_bytes_recursive
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_empty_payload() {
        let snapshot = StatsSnapshot::from_json(b"{}").unwrap();
        assert_eq!(snapshot, StatsSnapshot::default());
    }

    #[test]
    fn test_malformed_substructure_is_dropped_not_fatal() {
        let payload = json!({
            "id": "abc123",
            "cpu_stats": "not an object",
            "memory_stats": { "usage": 42 },
            "blkio_stats": { "io_service_bytes_recursive": "not a list" }
        });
        let snapshot = StatsSnapshot::from_value(&payload);

        assert_eq!(snapshot.id.as_deref(), Some("abc123"));
        assert_eq!(snapshot.cpu_stats, None);
        assert_eq!(snapshot.memory_stats.unwrap().usage, Some(42));
        assert_eq!(snapshot.blkio_stats, None);
    }

    #[test]
    fn test_invalid_body_errors() {
        assert!(StatsSnapshot::from_json(b"no json here").is_err());
    }
}
