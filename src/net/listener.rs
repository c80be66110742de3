//! TCP listener.
//!
//! # Responsibilities
//! - Resolve the configured host and bind it with the port (0 = ephemeral)
//! - Report the port actually bound
//! - Accept incoming TCP connections

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::{lookup_host, TcpListener, TcpStream};

use crate::config::AdapterConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The configured host could not be resolved to an address.
    #[error("Cannot resolve bind host '{host}': {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// The configured host resolved to no addresses.
    #[error("Bind host '{0}' has no addresses")]
    NoAddress(String),

    /// Failed to bind to address.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Failed to accept connection.
    #[error("Failed to accept: {0}")]
    Accept(#[source] std::io::Error),
}

/// The adapter's bound socket.
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind to the configured host and port.
    ///
    /// Host names are resolved; the first address returned is bound.
    pub async fn bind(config: &AdapterConfig) -> Result<Self, ListenerError> {
        let host = config.host.as_str();
        let addr = lookup_host((host, config.bind_port()))
            .await
            .map_err(|source| ListenerError::Resolve {
                host: host.to_string(),
                source,
            })?
            .next()
            .ok_or_else(|| ListenerError::NoAddress(host.to_string()))?;
        Self::bind_addr(addr).await
    }

    /// Bind to an explicit socket address.
    pub async fn bind_addr(addr: SocketAddr) -> Result<Self, ListenerError> {
        let bind_err = |source| ListenerError::Bind { addr, source };
        let inner = TcpListener::bind(addr).await.map_err(bind_err)?;
        let local_addr = inner.local_addr().map_err(bind_err)?;
        Ok(Self { inner, local_addr })
    }

    /// Accept the next connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), ListenerError> {
        let (stream, peer) = self.inner.accept().await.map_err(ListenerError::Accept)?;
        tracing::trace!(peer_addr = %peer, "Connection accepted");
        Ok((stream, peer))
    }

    /// The address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The port this listener is bound to.
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zero_port_binds_ephemeral() {
        let config = AdapterConfig {
            host: "127.0.0.1".into(),
            port: Some(0),
            ..Default::default()
        };
        let listener = Listener::bind(&config).await.unwrap();
        assert_ne!(listener.port(), 0);
    }

    #[tokio::test]
    async fn host_names_are_resolved() {
        let config = AdapterConfig {
            host: "localhost".into(),
            port: Some(0),
            ..Default::default()
        };
        let listener = Listener::bind(&config).await.unwrap();
        assert!(listener.local_addr().ip().is_loopback());
        assert_ne!(listener.port(), 0);
    }

    #[tokio::test]
    async fn port_in_use_is_a_bind_error() {
        let first = Listener::bind_addr("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let err = Listener::bind_addr(first.local_addr()).await.err().unwrap();
        assert!(matches!(err, ListenerError::Bind { .. }));
    }
}
