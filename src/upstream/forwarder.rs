//! Upstream forwarding for proxy decisions.
//!
//! # Responsibilities
//! - Replay a canonical request against an arbitrary upstream target
//! - Recompute the `Host` header for the target
//! - Capture the upstream reply fully as a `ResponseSpec`
//!
//! No retries and no timeouts are applied here; a hung upstream stalls the
//! resolution that asked for it. Redirects are returned to the control plane
//! as-is, and environment proxy settings are ignored.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use reqwest::Method;
use thiserror::Error;
use url::Url;

use crate::protocol::types::{header_fields, CanonicalRequest, ResponseMode, ResponseSpec};

/// Errors from a single forwarding attempt.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The proxy target is not a usable URL.
    #[error("Invalid proxy target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Only plain and encrypted HTTP are supported.
    #[error("Unsupported proxy scheme '{0}'")]
    UnsupportedScheme(String),

    /// The replayed request carries a method that is not valid HTTP.
    #[error("Invalid method '{0}'")]
    InvalidMethod(String),

    /// Connecting to or reading from the upstream failed.
    #[error("Upstream request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Sends a canonical request to an upstream target.
#[async_trait]
pub trait Forwarder: Send + Sync {
    async fn forward(
        &self,
        target: &str,
        request: &CanonicalRequest,
    ) -> Result<ResponseSpec, ForwardError>;
}

/// `Host` header value for a target URL.
///
/// The port is omitted when it is the scheme's default (80 for `http`,
/// 443 for `https`).
pub fn host_header_for(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match (url.port_or_known_default(), default_port(url.scheme())) {
        (Some(port), Some(default)) if port == default => host.to_string(),
        (Some(port), _) => format!("{host}:{port}"),
        (None, _) => host.to_string(),
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    }
}

/// Build the outbound URL: target origin plus the request's path and query.
pub fn upstream_url(target: &str, request: &CanonicalRequest) -> Result<Url, ForwardError> {
    let mut url = Url::parse(target).map_err(|e| ForwardError::InvalidTarget {
        target: target.to_string(),
        reason: e.to_string(),
    })?;
    if default_port(url.scheme()).is_none() {
        return Err(ForwardError::UnsupportedScheme(url.scheme().to_string()));
    }

    url.set_path(&request.path);
    url.set_query(None);
    if !request.query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &request.query {
            for v in value.values() {
                pairs.append_pair(key, v);
            }
        }
    }
    Ok(url)
}

/// Forwarder backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpForwarder {
    client: reqwest::Client,
}

impl HttpForwarder {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }

    fn outbound_headers(request: &CanonicalRequest, url: &Url) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
                tracing::warn!(header = %name, "Dropping invalid header name");
                continue;
            };
            // Framing is recomputed for the body actually sent.
            if name == HOST || name == CONTENT_LENGTH || name == TRANSFER_ENCODING {
                continue;
            }
            for v in value.values() {
                if let Ok(v) = HeaderValue::from_str(v) {
                    headers.append(name.clone(), v);
                }
            }
        }
        if let Ok(host) = HeaderValue::from_str(&host_header_for(url)) {
            headers.insert(HOST, host);
        }
        headers
    }
}

#[async_trait]
impl Forwarder for HttpForwarder {
    async fn forward(
        &self,
        target: &str,
        request: &CanonicalRequest,
    ) -> Result<ResponseSpec, ForwardError> {
        let url = upstream_url(target, request)?;
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| ForwardError::InvalidMethod(request.method.clone()))?;
        let headers = Self::outbound_headers(request, &url);
        let transport = |source| ForwardError::Transport {
            url: url.to_string(),
            source,
        };

        tracing::debug!(
            from = %request.ip,
            method = %method,
            url = %url,
            "Proxy =>"
        );

        let mut builder = self.client.request(method, url.clone()).headers(headers);
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }
        let response = builder.send().await.map_err(transport)?;

        let status = response.status().as_u16();
        let headers = header_fields(response.headers());
        let bytes = response.bytes().await.map_err(transport)?;
        let (body, mode) = match String::from_utf8(bytes.to_vec()) {
            Ok(text) => (text, ResponseMode::Text),
            Err(_) => (STANDARD.encode(&bytes), ResponseMode::Binary),
        };

        tracing::debug!(
            from = %request.ip,
            status,
            mode = %mode,
            url = %url,
            "Proxy <="
        );

        Ok(ResponseSpec {
            status_code: Some(status),
            headers: Some(headers),
            body: Some(body),
            mode: Some(mode),
            blocked: false,
        })
    }
}
