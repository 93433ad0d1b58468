//! CPU counters from the daemon's stats payload.
//!
//! The daemon reports cumulative CPU time in nanoseconds, both for the
//! container (`cpu_usage.total_usage`) and for the whole host
//! (`system_cpu_usage`). A second reading from roughly one tick earlier
//! arrives under `precpu_stats` with the same shape; on the very first
//! sample after a container starts, that reading is empty and
//! `system_cpu_usage` is absent.

/// CPU counters for one reading (`cpu_stats` or `precpu_stats`).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct CpuStats {
    #[serde(default)]
    pub cpu_usage: Option<CpuUsage>,
    /// Cumulative host CPU time. Absent on the first reading.
    #[serde(default)]
    pub system_cpu_usage: Option<u64>,
    /// Number of CPUs available to the container.
    #[serde(default)]
    pub online_cpus: Option<u64>,
}

impl CpuStats {
    /// Total container CPU time, treating a missing leaf as 0.
    pub fn total_usage(&self) -> u64 {
        self.cpu_usage.as_ref().map_or(0, |usage| usage.total_usage)
    }

    /// CPU count for scaling the usage ratio.
    ///
    /// Falls back to the per-CPU usage vector length (the same fallback
    /// the Docker CLI uses for older daemons), then to 1.
    pub fn cpu_count(&self) -> u64 {
        self.online_cpus
            .or_else(|| {
                self.cpu_usage
                    .as_ref()
                    .and_then(|usage| usage.percpu_usage.as_ref())
                    .map(|per_cpu| per_cpu.len() as u64)
            })
            .filter(|&count| count > 0)
            .unwrap_or(1)
    }
}

/// The container's own usage counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct CpuUsage {
    /// Cumulative container CPU time across all CPUs.
    #[serde(default)]
    pub total_usage: u64,
    /// Cumulative CPU time per CPU; only reported by older daemons.
    #[serde(default)]
    pub percpu_usage: Option<Vec<u64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_reading_defaults() {
        let stats: CpuStats = serde_json::from_value(json!({})).unwrap();
        assert_eq!(stats.total_usage(), 0);
        assert_eq!(stats.system_cpu_usage, None);
        assert_eq!(stats.cpu_count(), 1);
    }

    #[test]
    fn test_cpu_count_prefers_online_cpus() {
        let stats: CpuStats = serde_json::from_value(json!({
            "online_cpus": 4,
            "cpu_usage": { "total_usage": 10, "percpu_usage": [5, 5] }
        }))
        .unwrap();
        assert_eq!(stats.cpu_count(), 4);
    }

    #[test]
    fn test_cpu_count_falls_back_to_percpu_len() {
        let stats: CpuStats = serde_json::from_value(json!({
            "cpu_usage": { "total_usage": 10, "percpu_usage": [5, 5, 0] }
        }))
        .unwrap();
        assert_eq!(stats.cpu_count(), 3);
    }

    #[test]
    fn test_zero_online_cpus_falls_back_to_one() {
        let stats: CpuStats = serde_json::from_value(json!({ "online_cpus": 0 })).unwrap();
        assert_eq!(stats.cpu_count(), 1);
    }
}
