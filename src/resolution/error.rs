//! Errors that abandon a request's resolution.

use thiserror::Error;

use crate::upstream::ForwardError;

/// Failure of a single resolution chain. Never retried.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The control plane could not be reached or the reply could not be read.
    #[error("POST to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The control plane answered with a non-2xx status.
    #[error("Control plane returned {status}: {body}")]
    ControlPlane { status: u16, body: String },

    /// The control plane's reply was not JSON.
    #[error("Control plane reply is not valid JSON: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// A proxy or response decision could not be decoded.
    #[error("Malformed decision: {0}")]
    MalformedDecision(String),

    /// The upstream named by a proxy decision could not be reached.
    #[error(transparent)]
    Upstream(#[from] ForwardError),
}

impl RelayError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Transport { .. } => "transport",
            RelayError::ControlPlane { .. } => "control_plane",
            RelayError::InvalidPayload(_) => "invalid_payload",
            RelayError::MalformedDecision(_) => "malformed_decision",
            RelayError::Upstream(_) => "upstream",
        }
    }
}
