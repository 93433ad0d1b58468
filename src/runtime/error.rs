use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The runtime API could not be reached at all.
    #[error("container runtime unreachable: {0}")]
    RuntimeUnavailable(#[source] std::io::Error),

    /// The container stopped between listing and the stats fetch.
    #[error("container vanished before stats could be read: {id}")]
    ContainerVanished { id: String },

    /// The runtime answered with a non-success status.
    #[error("runtime API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode runtime payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(#[from] hyper::Error),

    #[error("failed to build runtime request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("runtime request timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, Error>;
