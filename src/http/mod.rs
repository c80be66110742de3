//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper HTTP/1.1 connection, one task per connection)
//!     → request.rs (buffer body, build CanonicalRequest)
//!     → resolution relay (control plane, optional upstream proxying)
//!     → protocol::materialize (defaults applied)
//!     → response.rs (CompletedResponse → HTTP response)
//!     → Send to client, or drop the connection when blocked
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::canonicalize;
pub use response::{render, RenderError};
pub use server::{AdapterServer, ServeError};
