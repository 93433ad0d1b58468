//! Block I/O counters from the daemon's stats payload.

/// Block I/O service-bytes entries, one per (device, operation) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct BlkioStats {
    #[serde(default)]
    pub io_service_bytes_recursive: Option<Vec<BlkioEntry>>,
}

/// One per-device operation counter.
///
/// The daemon capitalizes `op` inconsistently between cgroup versions
/// (`Read` vs `read`), so consumers must compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct BlkioEntry {
    #[serde(default)]
    pub op: String,
    #[serde(default)]
    pub value: u64,
}

impl BlkioStats {
    /// Sums the byte values of all entries whose operation tag matches
    /// `op` case-insensitively.
    pub fn total_for_op(&self, op: &str) -> u64 {
        let Some(entries) = &self.io_service_bytes_recursive else {
            return 0;
        };
        entries
            .iter()
            .filter(|entry| entry.op.eq_ignore_ascii_case(op))
            .map(|entry| entry.value)
            .sum()
    }
}
