//! The resolution relay.
//!
//! Drives one canonical request through the control plane until a terminal
//! decision arrives:
//!
//! ```text
//! POST {request} → primary callback
//!     ├─ {response}            → done
//!     ├─ {proxy, request, callbackURL}
//!     │       → forward upstream
//!     │       → POST {proxyResponse} → callbackURL
//!     │       → interpret the reply again (any depth)
//!     └─ anything else         → done, verbatim
//! ```
//!
//! Each POST is issued only after the previous reply has been received.

use std::sync::Arc;

use serde_json::json;

use crate::observability::metrics;
use crate::protocol::types::CanonicalRequest;
use crate::resolution::callback::{CallbackUrl, ControlPlane};
use crate::resolution::decision::{Decision, Resolution};
use crate::resolution::error::RelayError;
use crate::upstream::Forwarder;

/// Resolves canonical requests against the control plane.
#[derive(Clone)]
pub struct ResolutionRelay {
    control_plane: Arc<dyn ControlPlane>,
    forwarder: Arc<dyn Forwarder>,
    callback_url: CallbackUrl,
}

impl ResolutionRelay {
    pub fn new(
        control_plane: Arc<dyn ControlPlane>,
        forwarder: Arc<dyn Forwarder>,
        callback_url: CallbackUrl,
    ) -> Self {
        Self {
            control_plane,
            forwarder,
            callback_url,
        }
    }

    /// The primary callback address requests are posted to.
    pub fn callback_url(&self) -> &CallbackUrl {
        &self.callback_url
    }

    /// Resolve `request` to a terminal outcome.
    pub async fn resolve(&self, request: &CanonicalRequest) -> Result<Resolution, RelayError> {
        let reply = self
            .control_plane
            .post_json(self.callback_url.as_str(), &json!({ "request": request }))
            .await?;
        let mut decision = Decision::from_value(reply)?;
        let mut rounds = 0u32;

        loop {
            match decision {
                Decision::Proxy(instruction) => {
                    rounds += 1;
                    metrics::record_proxy_round();
                    tracing::debug!(
                        round = rounds,
                        to = %instruction.proxy.to,
                        callback = %instruction.callback_url,
                        "Proxying on behalf of control plane"
                    );

                    let proxied = self
                        .forwarder
                        .forward(&instruction.proxy.to, &instruction.request)
                        .await?;
                    let reply = self
                        .control_plane
                        .post_json(
                            &instruction.callback_url,
                            &json!({ "proxyResponse": proxied }),
                        )
                        .await?;
                    decision = Decision::from_value(reply)?;
                }
                Decision::Response(spec) => return Ok(Resolution::Response(spec)),
                Decision::Opaque(value) => return Ok(Resolution::Verbatim(value)),
            }
        }
    }
}
