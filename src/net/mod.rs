//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind configured or ephemeral port, accept loop)
//!     → connection.rs (connection IDs for log correlation)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - The bound port is reported once listening begins; it drives the
//!   primary callback URL
//! - No connection limit: every accepted connection is served concurrently

pub mod connection;
pub mod listener;

pub use connection::ConnectionId;
pub use listener::{Listener, ListenerError};
