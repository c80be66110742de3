//! HTTP protocol adapter.
//!
//! Listens for HTTP requests, turns each into a canonical JSON record and
//! lets an external control plane decide how to answer: with a response,
//! by proxying upstream and reporting back, or by dropping the connection.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod protocol;
pub mod resolution;
pub mod upstream;

pub use config::AdapterConfig;
pub use http::AdapterServer;
pub use lifecycle::Shutdown;
