//! Per-interface network counters from the daemon's stats payload.

/// Receive/transmit byte counters for a single interface.
///
/// The snapshot's `networks` map carries one of these per interface,
/// keyed by name (`eth0` for the default bridge adapter, `host` when the
/// container shares the host's network namespace).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct NetworkStats {
    #[serde(default)]
    pub rx_bytes: u64,
    #[serde(default)]
    pub tx_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_counters_default_to_zero() {
        let stats: NetworkStats = serde_json::from_str(r#"{"rx_bytes": 12}"#).unwrap();
        assert_eq!(stats.rx_bytes, 12);
        assert_eq!(stats.tx_bytes, 0);
    }
}
