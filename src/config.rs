//! Exporter configuration, read from `DOCKERSTATS_*` environment variables.
//!
//! All settings have defaults matching a local single-host deployment:
//! listen on port 9487 and talk to the daemon over `/var/run/docker.sock`.
//! Setting both `DOCKERSTATS_HOST_IP` and `DOCKERSTATS_HOST_PORT` switches
//! the runtime connection to TCP instead of the local socket.

use std::path::PathBuf;
use std::time::Duration;

/// Listen port for the scrape endpoint.
const VAR_PORT: &str = "DOCKERSTATS_PORT";
/// Remote Docker daemon IP; only used together with [`VAR_HOST_PORT`].
const VAR_HOST_IP: &str = "DOCKERSTATS_HOST_IP";
/// Remote Docker daemon port; only used together with [`VAR_HOST_IP`].
const VAR_HOST_PORT: &str = "DOCKERSTATS_HOST_PORT";
/// Path of the local Docker socket.
const VAR_SOCKET_PATH: &str = "DOCKERSTATS_SOCKET_PATH";
/// Proactive sampling interval in seconds.
const VAR_INTERVAL: &str = "DOCKERSTATS_INTERVAL_SECONDS";
/// Container name pattern, passed through to the daemon's own filtering.
const VAR_CONTAINER_FILTER: &str = "DOCKERSTATS_CONTAINER_FILTER";
/// Whether to expose process-level default metrics next to container stats.
const VAR_DEFAULT_METRICS: &str = "DOCKERSTATS_DEFAULT_METRICS";
/// Whether a scrape triggers a sampling pass before rendering.
const VAR_SAMPLE_ON_SCRAPE: &str = "DOCKERSTATS_SAMPLE_ON_SCRAPE";

const DEFAULT_PORT: u16 = 9487;
const DEFAULT_SOCKET_PATH: &str = "/var/run/docker.sock";
const DEFAULT_INTERVAL_SECS: u64 = 15;

/// Lower bound for the sampling interval, to cap load on the daemon API.
pub const MIN_INTERVAL_SECS: u64 = 3;

/// Where the Docker Engine API is reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEndpoint {
    UnixSocket(PathBuf),
    Http { host: String, port: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Port the exporter's HTTP listener binds to.
    pub port: u16,
    /// Docker Engine API endpoint.
    pub endpoint: RuntimeEndpoint,
    /// Interval between proactive sampling passes (floor-clamped).
    pub interval: Duration,
    /// Optional container name pattern forwarded to the daemon.
    pub container_filter: Option<String>,
    /// Register process-level default metrics in the registry.
    pub default_metrics: bool,
    /// Run a sampling pass synchronously on every scrape.
    pub sample_on_scrape: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid value for `{var}`: `{value}`")]
    InvalidValue { var: &'static str, value: String },
    #[error("`{0}` requires `{1}` to be set as well")]
    IncompleteEndpoint(&'static str, &'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads the configuration through the given variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] for unparsable numeric or boolean
    /// values and [`Error::IncompleteEndpoint`] if only one half of the
    /// TCP endpoint pair is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = parse_or(&lookup, VAR_PORT, DEFAULT_PORT)?;

        let host_ip = lookup(VAR_HOST_IP).filter(|v| !v.is_empty());
        let host_port: Option<u16> = match lookup(VAR_HOST_PORT).filter(|v| !v.is_empty()) {
            Some(raw) => Some(parse(VAR_HOST_PORT, &raw)?),
            None => None,
        };
        let endpoint = match (host_ip, host_port) {
            (Some(host), Some(port)) => RuntimeEndpoint::Http { host, port },
            (Some(_), None) => {
                return Err(Error::IncompleteEndpoint(VAR_HOST_IP, VAR_HOST_PORT));
            }
            (None, Some(_)) => {
                return Err(Error::IncompleteEndpoint(VAR_HOST_PORT, VAR_HOST_IP));
            }
            (None, None) => RuntimeEndpoint::UnixSocket(PathBuf::from(
                lookup(VAR_SOCKET_PATH).unwrap_or_else(|| DEFAULT_SOCKET_PATH.to_owned()),
            )),
        };

        let mut interval_secs = parse_or(&lookup, VAR_INTERVAL, DEFAULT_INTERVAL_SECS)?;
        if interval_secs < MIN_INTERVAL_SECS {
            log::warn!(
                "{VAR_INTERVAL}={interval_secs} is below the minimum, clamping to {MIN_INTERVAL_SECS}s"
            );
            interval_secs = MIN_INTERVAL_SECS;
        }

        Ok(Self {
            port,
            endpoint,
            interval: Duration::from_secs(interval_secs),
            container_filter: lookup(VAR_CONTAINER_FILTER).filter(|v| !v.is_empty()),
            default_metrics: parse_bool_or(&lookup, VAR_DEFAULT_METRICS, true)?,
            sample_on_scrape: parse_bool_or(&lookup, VAR_SAMPLE_ON_SCRAPE, true)?,
        })
    }
}

fn parse<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T> {
    raw.parse().map_err(|_| Error::InvalidValue {
        var,
        value: raw.to_owned(),
    })
}

fn parse_or<T: std::str::FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T> {
    match lookup(var) {
        Some(raw) => parse(var, &raw),
        None => Ok(default),
    }
}

fn parse_bool_or(
    lookup: impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: bool,
) -> Result<bool> {
    match lookup(var).as_deref() {
        None => Ok(default),
        Some("1") | Some("true") => Ok(true),
        Some("0") | Some("false") => Ok(false),
        Some(raw) => Err(Error::InvalidValue {
            var,
            value: raw.to_owned(),
        }),
    }
}
