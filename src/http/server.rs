//! HTTP server for the adapter.
//!
//! # Responsibilities
//! - Serve HTTP/1.1 on every accepted connection
//! - Run the pipeline per request: canonicalize → resolve → materialize → render
//! - Close the connection without a response when blocked or when resolution fails
//!
//! Requests are independent; the only shared state is the read-only relay
//! configuration and the logger.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::http::request::canonicalize;
use crate::http::response::{render, RenderError};
use crate::net::{ConnectionId, Listener};
use crate::observability::metrics;
use crate::protocol::{materialize, ResponseSpec};
use crate::resolution::{CallbackUrl, HttpControlPlane, RelayError, Resolution, ResolutionRelay};
use crate::upstream::HttpForwarder;

/// Why a request ended without an HTTP response.
///
/// Returning any of these from the service makes hyper abort the connection
/// without writing response bytes.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The client went away before the body was complete.
    #[error("Failed to read request body: {0}")]
    Body(#[source] hyper::Error),

    #[error("Resolution failed: {0}")]
    Relay(#[from] RelayError),

    /// The control plane refused to answer this connection.
    #[error("Request blocked by control plane")]
    Blocked,

    #[error("Resolution result is not a response: {0}")]
    InvalidResolution(#[source] serde_json::Error),

    #[error("Failed to render response: {0}")]
    Render(#[from] RenderError),
}

/// Per-request pipeline shared by all connections.
struct Pipeline {
    relay: ResolutionRelay,
    defaults: ResponseSpec,
}

impl Pipeline {
    async fn handle(
        &self,
        request: Request<Incoming>,
        peer: SocketAddr,
        connection_id: ConnectionId,
    ) -> Result<Response<Full<Bytes>>, ServeError> {
        let start = Instant::now();
        let request_id = Uuid::new_v4();

        tracing::info!("{} {}", request.method(), request.uri());
        metrics::record_request(request.method().as_str());

        let result = self.respond(request, peer, request_id).await;
        match &result {
            Ok((response, outcome)) => {
                metrics::record_resolution(*outcome, start);
                tracing::debug!(
                    request_id = %request_id,
                    connection_id = %connection_id,
                    status = response.status().as_u16(),
                    "Response written"
                );
            }
            Err(ServeError::Blocked) => {
                metrics::record_resolution("blocked", start);
                tracing::info!(
                    request_id = %request_id,
                    connection_id = %connection_id,
                    peer_addr = %peer,
                    "Connection blocked by control plane"
                );
            }
            Err(e) => {
                metrics::record_resolution("failed", start);
                tracing::error!(
                    request_id = %request_id,
                    connection_id = %connection_id,
                    error = %e,
                    "Dropping connection"
                );
            }
        }
        result.map(|(response, _)| response)
    }

    async fn respond(
        &self,
        request: Request<Incoming>,
        peer: SocketAddr,
        request_id: Uuid,
    ) -> Result<(Response<Full<Bytes>>, &'static str), ServeError> {
        let canonical = canonicalize(request, peer).await.map_err(ServeError::Body)?;
        tracing::debug!(
            request_id = %request_id,
            request = %json_line(&canonical),
            "Canonical request"
        );

        let resolution = self.relay.resolve(&canonical).await?;
        if resolution.is_blocked() {
            return Err(ServeError::Blocked);
        }
        let outcome = resolution.outcome();
        if let Resolution::Verbatim(_) = &resolution {
            tracing::debug!(request_id = %request_id, "Using control plane reply verbatim");
        }

        let spec = resolution
            .into_response_spec()
            .map_err(ServeError::InvalidResolution)?;
        let completed = materialize(spec, &self.defaults);
        tracing::debug!(
            request_id = %request_id,
            response = %json_line(&completed),
            "Completed response"
        );

        Ok((render(&completed)?, outcome))
    }
}

fn json_line<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}

/// HTTP server for the protocol adapter.
#[derive(Clone)]
pub struct AdapterServer {
    pipeline: Arc<Pipeline>,
}

impl AdapterServer {
    /// Create a server talking to the control plane at `callback_url`.
    pub fn new(
        callback_url: CallbackUrl,
        defaults: ResponseSpec,
    ) -> Result<Self, reqwest::Error> {
        let relay = ResolutionRelay::new(
            Arc::new(HttpControlPlane::new()?),
            Arc::new(HttpForwarder::new()?),
            callback_url,
        );
        Ok(Self::with_relay(relay, defaults))
    }

    /// Create a server around an existing relay.
    pub fn with_relay(relay: ResolutionRelay, defaults: ResponseSpec) -> Self {
        Self {
            pipeline: Arc::new(Pipeline { relay, defaults }),
        }
    }

    /// Accept connections until `shutdown` fires.
    pub async fn run(self, listener: Listener, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            address = %listener.local_addr(),
            callback_url = %self.pipeline.relay.callback_url(),
            "Adapter listening"
        );

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => self.serve_connection(stream, peer),
                        Err(e) => tracing::warn!(error = %e, "Accept failed"),
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
            }
        }
    }

    fn serve_connection(&self, stream: tokio::net::TcpStream, peer: SocketAddr) {
        let pipeline = self.pipeline.clone();
        let connection_id = ConnectionId::next();

        tokio::spawn(async move {
            let service = service_fn(move |request| {
                let pipeline = pipeline.clone();
                async move { pipeline.handle(request, peer, connection_id).await }
            });

            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                tracing::debug!(
                    connection_id = %connection_id,
                    peer_addr = %peer,
                    error = %e,
                    "Connection closed"
                );
            }
        });
    }
}
