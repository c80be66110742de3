//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! JSON object (first command-line argument)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AdapterConfig (validated, immutable)
//!     → callback URL computed once the listener has bound
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - Every field but the callback template has a default
//! - Unknown fields are ignored; the control plane may pass extras
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AdapterConfig, LogLevel};
