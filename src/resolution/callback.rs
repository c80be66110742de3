//! Control-plane callback channel.
//!
//! # Responsibilities
//! - Compute the primary callback URL once the listener port is known
//! - POST JSON payloads to callback URLs and decode the JSON reply
//! - Surface non-2xx replies as protocol errors carrying status and body

use std::fmt;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use url::Url;

use crate::resolution::error::RelayError;

/// Placeholder substituted with the bound port in the callback template.
pub const PORT_PLACEHOLDER: &str = ":port";

/// The primary control-plane address, fixed for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackUrl(Url);

impl CallbackUrl {
    /// Substitute the first `:port` in `template` and parse the result.
    pub fn from_template(template: &str, port: u16) -> Result<Self, url::ParseError> {
        let raw = template.replacen(PORT_PLACEHOLDER, &port.to_string(), 1);
        Url::parse(&raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }
}

impl fmt::Display for CallbackUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Posts JSON to the control plane and returns its JSON reply.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    async fn post_json(&self, url: &str, payload: &Value) -> Result<Value, RelayError>;
}

/// Control plane reached over HTTP with `reqwest`.
///
/// Redirects are not followed: a 3xx reply is a protocol error like any other
/// non-2xx status.
#[derive(Clone)]
pub struct HttpControlPlane {
    client: reqwest::Client,
}

impl HttpControlPlane {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ControlPlane for HttpControlPlane {
    async fn post_json(&self, url: &str, payload: &Value) -> Result<Value, RelayError> {
        let transport = |source| RelayError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_string())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            return Err(RelayError::ControlPlane {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
