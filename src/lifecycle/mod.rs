//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Bind listener → Compute callback URL → Report port
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and reported as JSON on stderr
//! - The metadata line on stdout is the readiness signal; nothing is
//!   logged to stdout before it
//! - In-flight requests are not drained; their connections die with the process

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start, Started, StartupError, StartupMetadata};
