//! Upstream proxying subsystem.
//!
//! # Data Flow
//! ```text
//! proxy decision (target URL + canonical request)
//!     → forwarder.rs (URL + Host rewrite, send, buffer reply)
//!     → ResponseSpec handed back to the resolution relay
//! ```

pub mod forwarder;

pub use forwarder::{host_header_for, Forwarder, ForwardError, HttpForwarder};
