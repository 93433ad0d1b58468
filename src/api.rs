use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::ToSocketAddrs;

use crate::error::ResultOkLogExt;
use crate::sampler::Sampler;
use crate::store::{self, MetricStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MetricStore>,
    pub sampler: Arc<Sampler>,
    /// Run a sampling pass synchronously before rendering a scrape.
    pub sample_on_scrape: bool,
}

async fn serve_metrics(State(state): State<AppState>) -> Response {
    if state.sample_on_scrape {
        // A failed pass is logged and the previous values are served.
        state.sampler.sample().await.ok_log();
    }

    match state.store.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, store::EXPOSITION_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(err) => {
            log::error!("Failed to render metrics: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to render metrics",
            )
                .into_response()
        }
    }
}

async fn fallback() -> Response {
    (StatusCode::NOT_FOUND, "Support GET /metrics only").into_response()
}

async fn method_not_allowed() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, "Support GET /metrics only").into_response()
}

pub struct APIServer {
    router: axum::Router,
}

impl APIServer {
    pub fn new(state: AppState) -> Self {
        let router = axum::Router::new()
            .route("/metrics", get(serve_metrics))
            .fallback(fallback)
            .method_not_allowed_fallback(method_not_allowed)
            .with_state(state);
        Self { router }
    }

    pub async fn listen(self, addr: impl ToSocketAddrs) {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("TCP Listener bind");
        axum::serve(listener, self.router.into_make_service())
            .await
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use crate::runtime::{self, ContainerSummary};
    use crate::stats::StatsSnapshot;

    struct NoopRuntime;

    #[async_trait]
    impl runtime::Client for NoopRuntime {
        async fn list(&self, _filter: Option<&str>) -> runtime::Result<Vec<ContainerSummary>> {
            Ok(Vec::new())
        }

        async fn stats(&self, _id: &str) -> runtime::Result<StatsSnapshot> {
            Ok(StatsSnapshot::default())
        }

        async fn ping(&self) -> runtime::Result<()> {
            Ok(())
        }
    }

    async fn spawn_server() -> SocketAddr {
        let store = Arc::new(MetricStore::new(false).unwrap());
        let sampler = Arc::new(Sampler::new(Arc::new(NoopRuntime), Arc::clone(&store), None));
        let server = APIServer::new(AppState {
            store,
            sampler,
            sample_on_scrape: false,
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, server.router.into_make_service())
                .await
                .unwrap()
        });
        addr
    }

    async fn raw_request(addr: SocketAddr, method: &str, path: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request =
            format!("{method} {path} HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_get_metrics_serves_exposition() {
        let addr = spawn_server().await;
        let response = raw_request(addr, "GET", "/metrics").await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains(store::EXPOSITION_CONTENT_TYPE));
    }

    #[tokio::test]
    async fn test_unknown_path_gets_plain_text_rejection() {
        let addr = spawn_server().await;
        let response = raw_request(addr, "GET", "/healthz").await;
        assert!(response.starts_with("HTTP/1.1 404"));
        assert!(response.contains("Support GET /metrics only"));
    }

    #[tokio::test]
    async fn test_non_get_method_gets_plain_text_rejection() {
        let addr = spawn_server().await;
        let response = raw_request(addr, "POST", "/metrics").await;
        assert!(response.starts_with("HTTP/1.1 405"));
        assert!(response.contains("Support GET /metrics only"));
    }
}
