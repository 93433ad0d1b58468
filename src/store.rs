//! The metric store: last-published values per (metric, container).
//!
//! Thin wrapper over a Prometheus registry holding one gauge family per
//! derived metric, labeled by container name and short id. Publication
//! follows a reset-then-rebuild discipline: every successful pass clears
//! all previously set label-sets before writing the new ones, so a
//! container that stopped can never leak stale series into a scrape.
//!
//! Publishing and rendering share one mutex, which is what makes the
//! clear-then-write sequence atomic from a scraper's point of view: a
//! concurrent scrape observes either the previous pass or the new one,
//! never a half-cleared store.

use std::sync::Mutex;

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::container::ContainerIdentity;
use crate::stats::DerivedMetrics;

/// Content type of the rendered exposition output.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Labels every container metric is scoped by.
const LABELS: [&str; 2] = ["name", "id"];

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to register metric: {0}")]
    Register(#[source] prometheus::Error),
    #[error("failed to encode metrics: {0}")]
    Encode(#[source] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub struct MetricStore {
    registry: Registry,
    cpu_usage_ratio: GaugeVec,
    memory_usage_bytes: GaugeVec,
    memory_usage_rss_bytes: GaugeVec,
    memory_limit_bytes: GaugeVec,
    memory_usage_ratio: GaugeVec,
    network_received_bytes: GaugeVec,
    network_transmitted_bytes: GaugeVec,
    blkio_read_bytes: GaugeVec,
    blkio_written_bytes: GaugeVec,
    // Serializes publish() against render(); see the module docs.
    lock: Mutex<()>,
}

impl MetricStore {
    /// Creates the store and registers every gauge family.
    ///
    /// With `default_metrics`, process-level collectors are registered
    /// alongside the container gauges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Register`] on a registry conflict.
    pub fn new(default_metrics: bool) -> Result<Self> {
        let registry = Registry::new();

        let store = Self {
            cpu_usage_ratio: gauge(
                &registry,
                "dockerstats_cpu_usage_ratio",
                "CPU usage percentage 0-100",
            )?,
            memory_usage_bytes: gauge(
                &registry,
                "dockerstats_memory_usage_bytes",
                "Memory usage in bytes",
            )?,
            memory_usage_rss_bytes: gauge(
                &registry,
                "dockerstats_memory_usage_rss_bytes",
                "Resident set size in bytes",
            )?,
            memory_limit_bytes: gauge(
                &registry,
                "dockerstats_memory_limit_bytes",
                "Memory limit in bytes",
            )?,
            memory_usage_ratio: gauge(
                &registry,
                "dockerstats_memory_usage_ratio",
                "Memory usage percentage 0-100",
            )?,
            network_received_bytes: gauge(
                &registry,
                "dockerstats_network_received_bytes",
                "Network received in bytes",
            )?,
            network_transmitted_bytes: gauge(
                &registry,
                "dockerstats_network_transmitted_bytes",
                "Network transmitted in bytes",
            )?,
            blkio_read_bytes: gauge(
                &registry,
                "dockerstats_blkio_read_bytes",
                "Block I/O read in bytes",
            )?,
            blkio_written_bytes: gauge(
                &registry,
                "dockerstats_blkio_written_bytes",
                "Block I/O written in bytes",
            )?,
            registry,
            lock: Mutex::new(()),
        };

        #[cfg(target_os = "linux")]
        if default_metrics {
            store
                .registry
                .register(Box::new(
                    prometheus::process_collector::ProcessCollector::for_self(),
                ))
                .map_err(Error::Register)?;
        }
        #[cfg(not(target_os = "linux"))]
        let _ = default_metrics;

        Ok(store)
    }

    /// Replaces the stored values with exactly the given pass results.
    ///
    /// An empty slice is a valid pass: it clears the store.
    pub fn publish(&self, entries: &[(ContainerIdentity, DerivedMetrics)]) {
        let _guard = self.lock.lock().expect("metric store lock poisoned");

        self.reset_all();
        for (identity, metrics) in entries {
            let labels = [identity.name(), identity.short_id()];

            self.cpu_usage_ratio
                .with_label_values(&labels)
                .set(metrics.cpu_usage_ratio);
            self.memory_usage_bytes
                .with_label_values(&labels)
                .set(metrics.memory_usage_bytes as f64);
            self.memory_usage_rss_bytes
                .with_label_values(&labels)
                .set(metrics.memory_usage_rss_bytes as f64);
            self.memory_limit_bytes
                .with_label_values(&labels)
                .set(metrics.memory_limit_bytes as f64);
            self.memory_usage_ratio
                .with_label_values(&labels)
                .set(metrics.memory_usage_ratio);
            if let Some(network) = &metrics.network {
                self.network_received_bytes
                    .with_label_values(&labels)
                    .set(network.received_bytes as f64);
                self.network_transmitted_bytes
                    .with_label_values(&labels)
                    .set(network.transmitted_bytes as f64);
            }
            self.blkio_read_bytes
                .with_label_values(&labels)
                .set(metrics.blkio_read_bytes as f64);
            self.blkio_written_bytes
                .with_label_values(&labels)
                .set(metrics.blkio_written_bytes as f64);
        }
    }

    /// Renders the current values in text-exposition format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if encoding fails.
    pub fn render(&self) -> Result<String> {
        let _guard = self.lock.lock().expect("metric store lock poisoned");

        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(Error::Encode)?;
        Ok(String::from_utf8(buffer).expect("exposition output is UTF-8"))
    }

    fn reset_all(&self) {
        self.cpu_usage_ratio.reset();
        self.memory_usage_bytes.reset();
        self.memory_usage_rss_bytes.reset();
        self.memory_limit_bytes.reset();
        self.memory_usage_ratio.reset();
        self.network_received_bytes.reset();
        self.network_transmitted_bytes.reset();
        self.blkio_read_bytes.reset();
        self.blkio_written_bytes.reset();
    }
}

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<GaugeVec> {
    let gauge = GaugeVec::new(Opts::new(name, help), &LABELS).map_err(Error::Register)?;
    registry
        .register(Box::new(gauge.clone()))
        .map_err(Error::Register)?;
    Ok(gauge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::NetworkTotals;

    fn entry(name: &str, id: &str) -> (ContainerIdentity, DerivedMetrics) {
        (
            ContainerIdentity::new(name, id),
            DerivedMetrics {
                cpu_usage_ratio: 12.5,
                memory_usage_bytes: 1024,
                memory_limit_bytes: 4096,
                memory_usage_ratio: 25.0,
                network: Some(NetworkTotals {
                    received_bytes: 10,
                    transmitted_bytes: 20,
                }),
                ..DerivedMetrics::default()
            },
        )
    }

    #[test]
    fn test_publish_and_render() {
        let store = MetricStore::new(false).unwrap();
        store.publish(&[entry("/web", "abcdef0123456789")]);

        let output = store.render().unwrap();
        assert!(output.contains("dockerstats_cpu_usage_ratio"));
        assert!(output.contains(r#"name="web""#));
        assert!(output.contains(r#"id="abcdef012345""#));
        assert!(output.contains("12.5"));
    }

    #[test]
    fn test_publish_replaces_previous_pass() {
        let store = MetricStore::new(false).unwrap();
        store.publish(&[entry("/old", "1111111111110000")]);
        store.publish(&[entry("/new", "2222222222220000")]);

        let output = store.render().unwrap();
        assert!(output.contains(r#"name="new""#));
        assert!(!output.contains(r#"name="old""#));
        assert!(!output.contains("111111111111"));
    }

    #[test]
    fn test_empty_publish_clears_store() {
        let store = MetricStore::new(false).unwrap();
        store.publish(&[entry("/web", "abcdef0123456789")]);
        store.publish(&[]);

        let output = store.render().unwrap();
        assert!(!output.contains(r#"name="web""#));
    }

    #[test]
    fn test_network_series_omitted_when_absent() {
        let store = MetricStore::new(false).unwrap();
        let (identity, mut metrics) = entry("/hostnet", "3333333333330000");
        metrics.network = None;
        store.publish(&[(identity, metrics)]);

        let output = store.render().unwrap();
        assert!(output.contains(r#"dockerstats_cpu_usage_ratio{id="333333333333",name="hostnet"}"#));
        assert!(!output.contains(r#"dockerstats_network_received_bytes{id="333333333333""#));
    }

    #[test]
    fn test_render_on_fresh_store_is_empty_of_container_series() {
        let store = MetricStore::new(false).unwrap();
        let output = store.render().unwrap();
        assert!(!output.contains(r#"name="#));
    }
}
