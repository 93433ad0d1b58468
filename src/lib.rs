use std::sync::Arc;

/// dockerstats: a Prometheus exporter for per-container Docker resource usage.
///
/// This library discovers running containers through the Docker Engine API,
/// samples their resource counters concurrently, derives normalized metrics
/// (CPU/memory ratios, network and block I/O byte totals), and holds the
/// latest values ready to be scraped in text-exposition format.
pub mod api;
pub mod config;
pub mod container;
pub mod error;
pub mod runtime;
pub mod sampler;
pub mod stats;
pub mod store;

// Docker Engine API notes:
//
//  GET /containers/json             -> running containers only (no `all` param)
//      ?filters={"name":["<pat>"]}  -> daemon-side name filtering, the exporter
//                                      never matches patterns itself
//  GET /containers/<id>/stats?stream=false
//      -> one decoded snapshot; the daemon populates `precpu_stats` from an
//         internal reading taken roughly one tick earlier, so the very first
//         snapshot after a container starts can carry empty precpu counters
//
// Every nested field of the stats payload is optional in practice (host
// network mode drops `networks`, cgroup v2 renames memory counters), so the
// stats model treats the payload as a loosely-typed tree.

/// Runs the dockerstats exporter.
///
/// Wires up the Docker client, metric store, sampling scheduler, and HTTP
/// listener, then serves scrapes until the process is terminated.
///
/// # Errors
///
/// Possible errors include:
/// - Invalid configuration values in the `DOCKERSTATS_*` environment variables.
/// - A metric registration conflict in the Prometheus registry.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::from_env()?;

    let client: Arc<dyn runtime::Client> = match &config.endpoint {
        config::RuntimeEndpoint::UnixSocket(path) => {
            log::info!("Connecting to Docker on {}...", path.display());
            Arc::new(runtime::DockerClient::unix(path))
        }
        config::RuntimeEndpoint::Http { host, port } => {
            log::info!("Connecting to Docker on {host}:{port}...");
            Arc::new(runtime::DockerClient::http(host, *port))
        }
    };
    match client.ping().await {
        Ok(()) => log::info!("Connected to Docker"),
        // Not fatal: the daemon may come up later, every pass retries.
        Err(err) => log::warn!("Docker is not reachable yet: {err}"),
    }

    let store = Arc::new(store::MetricStore::new(config.default_metrics)?);
    let sampler = Arc::new(sampler::Sampler::new(
        Arc::clone(&client),
        Arc::clone(&store),
        config.container_filter.clone(),
    ));

    tokio::spawn(sampler::run_scheduler(
        Arc::clone(&sampler),
        config.interval,
    ));

    let state = api::AppState {
        store,
        sampler,
        sample_on_scrape: config.sample_on_scrape,
    };
    log::info!("dockerstats exporter listening on port {}", config.port);
    api::APIServer::new(state)
        .listen(("0.0.0.0", config.port))
        .await;

    Ok(())
}
