//! Request-resolution subsystem.
//!
//! # Data Flow
//! ```text
//! CanonicalRequest
//!     → relay.rs (orchestrates the control-plane conversation)
//!     → callback.rs (JSON POSTs to primary / secondary callbacks)
//!     → decision.rs (proxy | response | opaque)
//!     → upstream::Forwarder when a proxy round is requested
//!     → Resolution (response, verbatim, or blocked)
//! ```
//!
//! # Design Decisions
//! - The primary callback URL is computed once after bind and passed in
//! - Proxy rounds nest to any depth; each POST waits for the previous reply
//! - Any failure abandons the request; nothing is retried

pub mod callback;
pub mod decision;
pub mod error;
pub mod relay;

pub use callback::{CallbackUrl, ControlPlane, HttpControlPlane};
pub use decision::{Decision, ProxyInstruction, ProxyTarget, Resolution};
pub use error::RelayError;
pub use relay::ResolutionRelay;
