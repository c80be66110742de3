//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind the listener (configured or ephemeral port)
//! - Compute the primary callback URL from the bound port
//! - Build the server and the readiness metadata
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The callback URL is derived after bind, never before

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::{AdapterConfig, ConfigError};
use crate::http::AdapterServer;
use crate::net::{Listener, ListenerError};
use crate::resolution::CallbackUrl;

/// Character encoding reported to the parent process.
pub const ENCODING: &str = "utf8";

/// First line written to stdout; signals readiness to the parent process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartupMetadata {
    pub port: u16,
    pub encoding: &'static str,
}

/// Fatal errors before the adapter starts serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("Invalid callback URL after port substitution: {0}")]
    CallbackUrl(#[source] url::ParseError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl StartupError {
    pub fn code(&self) -> &'static str {
        match self {
            StartupError::Config(_) => "invalid configuration",
            StartupError::Listener(_) => "cannot bind",
            StartupError::CallbackUrl(_) => "invalid callback url",
            StartupError::HttpClient(_) => "http client unavailable",
        }
    }

    /// JSON form written to stderr before exiting.
    pub fn to_json(&self) -> Value {
        json!({ "code": self.code(), "message": self.to_string() })
    }
}

/// A bound, not-yet-running adapter.
pub struct Started {
    pub listener: Listener,
    pub server: AdapterServer,
    pub metadata: StartupMetadata,
}

/// Bind and assemble the adapter described by `config`.
pub async fn start(config: &AdapterConfig) -> Result<Started, StartupError> {
    let listener = Listener::bind(config).await?;
    let port = listener.port();

    let callback_url = CallbackUrl::from_template(&config.callback_url_template, port)
        .map_err(StartupError::CallbackUrl)?;
    let server = AdapterServer::new(callback_url, config.response_defaults())
        .map_err(StartupError::HttpClient)?;

    Ok(Started {
        listener,
        server,
        metadata: StartupMetadata {
            port,
            encoding: ENCODING,
        },
    })
}
