use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper_util::rt::TokioIo;

use super::error::{Error, Result};
use super::{Client, ContainerSummary};
use crate::stats::StatsSnapshot;

/// Upper bound for one request against the Engine API, connect included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
enum Endpoint {
    Unix(PathBuf),
    Tcp(String),
}

/// A [`Client`] implementation speaking the Docker Engine REST API.
///
/// Connections are opened per request: the Engine API is low-traffic here
/// (one listing plus one stats call per container per pass) and a fresh
/// HTTP/1 handshake keeps the client free of pool state.
#[derive(Debug, Clone)]
pub struct DockerClient {
    endpoint: Endpoint,
    timeout: Duration,
}

impl DockerClient {
    /// Creates a client for the local Docker socket.
    pub fn unix(path: impl AsRef<Path>) -> Self {
        Self {
            endpoint: Endpoint::Unix(path.as_ref().to_path_buf()),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Creates a client for a remote daemon listening on plain TCP.
    pub fn http(host: &str, port: u16) -> Self {
        Self {
            endpoint: Endpoint::Tcp(format!("{host}:{port}")),
            timeout: REQUEST_TIMEOUT,
        }
    }

    async fn get(&self, path_and_query: &str) -> Result<Bytes> {
        let request = async {
            match &self.endpoint {
                Endpoint::Unix(path) => {
                    let stream = tokio::net::UnixStream::connect(path)
                        .await
                        .map_err(Error::RuntimeUnavailable)?;
                    roundtrip(TokioIo::new(stream), path_and_query).await
                }
                Endpoint::Tcp(addr) => {
                    let stream = tokio::net::TcpStream::connect(addr.as_str())
                        .await
                        .map_err(Error::RuntimeUnavailable)?;
                    roundtrip(TokioIo::new(stream), path_and_query).await
                }
            }
        };

        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
    }
}

/// Sends one `GET` over a freshly established HTTP/1 connection.
async fn roundtrip<T>(io: T, path_and_query: &str) -> Result<Bytes>
where
    T: hyper::rt::Read + hyper::rt::Write + Unpin + Send + 'static,
{
    let (mut sender, connection) = hyper::client::conn::http1::handshake(io).await?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            log::debug!("runtime connection closed: {err}");
        }
    });

    let request = hyper::Request::builder()
        .method(hyper::Method::GET)
        .uri(path_and_query)
        .header(hyper::header::HOST, "docker")
        .body(Empty::<Bytes>::new())?;
    let response = sender.send_request(request).await?;

    let status = response.status();
    let body = response.into_body().collect().await?.to_bytes();
    if status.is_success() {
        Ok(body)
    } else {
        Err(Error::Api {
            status: status.as_u16(),
            message: String::from_utf8_lossy(&body).trim().to_owned(),
        })
    }
}

/// Builds the listing request path, encoding the optional name filter the
/// way the Engine API expects (`filters` as URL-encoded JSON).
fn list_path(filter: Option<&str>) -> String {
    match filter {
        Some(pattern) => {
            let filters = serde_json::json!({ "name": [pattern] }).to_string();
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("filters", &filters)
                .finish();
            format!("/containers/json?{query}")
        }
        None => "/containers/json".to_owned(),
    }
}

/// Builds the one-shot stats request path for a container.
fn stats_path(id: &str) -> String {
    format!("/containers/{id}/stats?stream=false")
}

#[async_trait::async_trait]
impl Client for DockerClient {
    async fn list(&self, filter: Option<&str>) -> Result<Vec<ContainerSummary>> {
        let body = self.get(&list_path(filter)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn stats(&self, id: &str) -> Result<StatsSnapshot> {
        let body = self.get(&stats_path(id)).await.map_err(|err| match err {
            Error::Api { status: 404, .. } => Error::ContainerVanished { id: id.to_owned() },
            other => other,
        })?;
        Ok(StatsSnapshot::from_json(&body)?)
    }

    async fn ping(&self) -> Result<()> {
        self.get("/_ping").await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_path_without_filter() {
        assert_eq!(list_path(None), "/containers/json");
    }

    #[test]
    fn test_list_path_encodes_filter() {
        let path = list_path(Some("web"));
        assert_eq!(
            path,
            "/containers/json?filters=%7B%22name%22%3A%5B%22web%22%5D%7D"
        );
    }

    #[test]
    fn test_stats_path_is_non_streaming() {
        assert_eq!(
            stats_path("abc123"),
            "/containers/abc123/stats?stream=false"
        );
    }
}
