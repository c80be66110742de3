//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (level-prefixed lines on stdout)
//!     → metrics.rs (counters and histograms via the `metrics` facade)
//!
//! Consumers:
//!     → The parent process, which classifies stdout lines by their prefix
//!     → Any metrics recorder installed by an embedding process
//! ```
//!
//! # Design Decisions
//! - Every log line starts with `debug `, `info `, `warn ` or `error `
//! - Request ID and connection ID are attached as structured fields
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
