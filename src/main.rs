/// Entry point for the dockerstats Prometheus exporter.
///
/// This binary connects to a Docker daemon (local socket or remote TCP),
/// periodically samples per-container resource usage through the Engine API,
/// and serves the derived metrics in Prometheus text-exposition format.
///
/// # Errors
///
/// Returns an error if initialization fails (e.g., invalid configuration
/// values or a metric registration conflict).
///
/// # Examples
///
/// ```bash
/// DOCKERSTATS_PORT=9487 cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    dockerstats::run().await
}
