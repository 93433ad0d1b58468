//! The container-runtime boundary of the exporter.
//!
//! [`Client`] is the seam the sampler works against: list running
//! containers (optionally filtered by name on the daemon side) and fetch a
//! single decoded stats snapshot per container. [`DockerClient`] implements
//! it over the Docker Engine REST API, reachable through the local unix
//! socket or a remote TCP endpoint.

mod docker;
mod error;

pub use docker::DockerClient;
pub use error::{Error, Result};

use async_trait::async_trait;

use crate::stats::StatsSnapshot;

/// One entry of the runtime's container listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSummary {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub names: Vec<String>,
}

impl ContainerSummary {
    /// The first runtime-assigned name, if the daemon reported any.
    pub fn name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }
}

/// A client for the container runtime's discovery and stats endpoints.
#[async_trait]
pub trait Client: Send + Sync {
    /// Lists the currently running containers.
    ///
    /// `filter` is a name pattern handed through unmodified to the
    /// runtime's own filtering mechanism.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RuntimeUnavailable`] if the runtime API cannot be
    /// reached.
    async fn list(&self, filter: Option<&str>) -> Result<Vec<ContainerSummary>>;

    /// Fetches one non-streaming, decoded stats snapshot for a container.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContainerVanished`] if the container stopped
    /// between listing and fetch.
    async fn stats(&self, id: &str) -> Result<StatsSnapshot>;

    /// Checks that the runtime API answers at all.
    async fn ping(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_summary_from_listing_payload() {
        let listing: Vec<ContainerSummary> = serde_json::from_str(
            r#"[{"Id":"abc123","Names":["/web"],"Image":"nginx:latest","State":"running"}]"#,
        )
        .unwrap();

        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].id, "abc123");
        assert_eq!(listing[0].name(), Some("/web"));
    }

    #[test]
    fn test_container_summary_tolerates_missing_fields() {
        let summary: ContainerSummary = serde_json::from_str("{}").unwrap();
        assert_eq!(summary.id, "");
        assert_eq!(summary.name(), None);
    }
}
