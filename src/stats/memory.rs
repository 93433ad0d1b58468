//! Memory counters from the daemon's stats payload.

use std::collections::HashMap;

/// Memory usage, limit, and the kernel's detailed counter map.
///
/// The `stats` map is keyed by cgroup counter name and differs between
/// cgroup v1 (`rss`, `cache`, ...) and v2 (`anon`, `file`, ...); both
/// forms are a flat map of byte counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct MemoryStats {
    #[serde(default)]
    pub usage: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub stats: Option<HashMap<String, u64>>,
}

impl MemoryStats {
    /// Resident set size in bytes, 0 when the kernel does not report it.
    ///
    /// cgroup v1 calls this counter `rss`; under v2 the closest
    /// equivalent is `anon`.
    pub fn rss(&self) -> u64 {
        let Some(stats) = &self.stats else {
            return 0;
        };
        stats
            .get("rss")
            .or_else(|| stats.get("anon"))
            .copied()
            .unwrap_or(0)
    }
}
