//! Configuration schema definitions.
//!
//! Field names follow the JSON object the control plane launches the adapter
//! with, e.g.
//!
//! ```json
//! {
//!   "port": 4545,
//!   "callbackURLTemplate": "http://localhost:2525/imposters/:port/_requests",
//!   "defaultResponse": { "statusCode": 404 },
//!   "loglevel": "debug"
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

use crate::protocol::ResponseSpec;

/// Root configuration for the adapter.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdapterConfig {
    /// Port to listen on; `None` or 0 selects an ephemeral port.
    pub port: Option<u16>,

    /// Interface to bind (default: all IPv4 interfaces).
    pub host: String,

    /// Template applied to every partial response.
    pub default_response: Option<ResponseSpec>,

    /// Primary callback URL with a literal `:port` placeholder.
    #[serde(rename = "callbackURLTemplate")]
    pub callback_url_template: String,

    /// Minimum severity that is logged.
    pub loglevel: LogLevel,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            port: None,
            host: "0.0.0.0".to_string(),
            default_response: None,
            callback_url_template: String::new(),
            loglevel: LogLevel::default(),
        }
    }
}

impl AdapterConfig {
    /// The port to bind, with 0 meaning "let the OS choose".
    pub fn bind_port(&self) -> u16 {
        self.port.unwrap_or(0)
    }

    /// The configured default response, or an empty one.
    pub fn response_defaults(&self) -> ResponseSpec {
        self.default_response.clone().unwrap_or_default()
    }
}

/// Ordered log severities understood by the parent process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}
