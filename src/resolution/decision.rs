//! Control-plane decisions and resolution outcomes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::protocol::types::{is_truthy, CanonicalRequest, ResponseSpec};
use crate::resolution::error::RelayError;

/// Where a proxy decision wants the request replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyTarget {
    /// Base URL of the upstream.
    pub to: String,
    /// Remaining proxy options, kept for logging.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

/// The control plane asks the adapter to proxy and report back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyInstruction {
    pub proxy: ProxyTarget,
    pub request: CanonicalRequest,
    /// Secondary callback that correlates the proxied result with the
    /// pending decision on the control-plane side.
    #[serde(rename = "callbackURL")]
    pub callback_url: String,
}

/// One reply from the control plane.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Proxy upstream, then post the result to `callback_url`.
    Proxy(ProxyInstruction),
    /// The final response.
    Response(ResponseSpec),
    /// Anything else, passed through untouched.
    Opaque(Value),
}

impl Decision {
    /// Classify a reply. A truthy `proxy` wins over a truthy `response`;
    /// everything else is opaque.
    pub fn from_value(value: Value) -> Result<Self, RelayError> {
        if value.get("proxy").is_some_and(is_truthy) {
            let instruction: ProxyInstruction = serde_json::from_value(value)
                .map_err(|e| RelayError::MalformedDecision(e.to_string()))?;
            return Ok(Decision::Proxy(instruction));
        }

        match value {
            Value::Object(mut fields) if fields.get("response").is_some_and(is_truthy) => {
                // A scalar or list response carries no fields; defaults apply.
                let spec = match fields.remove("response") {
                    Some(response @ Value::Object(_)) => serde_json::from_value(response)
                        .map_err(|e| RelayError::MalformedDecision(e.to_string()))?,
                    _ => ResponseSpec::default(),
                };
                Ok(Decision::Response(spec))
            }
            other => Ok(Decision::Opaque(other)),
        }
    }
}

/// Terminal result of resolving one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A `response` the control plane picked directly.
    Response(ResponseSpec),
    /// A reply that was neither a proxy nor a response decision.
    Verbatim(Value),
}

impl Resolution {
    /// Whether the connection must be closed without a response.
    pub fn is_blocked(&self) -> bool {
        match self {
            Resolution::Response(spec) => spec.blocked,
            Resolution::Verbatim(value) => value.get("blocked").is_some_and(is_truthy),
        }
    }

    /// Metrics label for a resolution that produced a response.
    pub fn outcome(&self) -> &'static str {
        match self {
            Resolution::Response(_) => "response",
            Resolution::Verbatim(_) => "verbatim",
        }
    }

    /// Read the outcome as a response; non-object payloads carry no fields.
    pub fn into_response_spec(self) -> Result<ResponseSpec, serde_json::Error> {
        match self {
            Resolution::Response(spec) => Ok(spec),
            Resolution::Verbatim(value @ Value::Object(_)) => serde_json::from_value(value),
            Resolution::Verbatim(_) => Ok(ResponseSpec::default()),
        }
    }
}
