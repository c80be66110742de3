//! Protocol-neutral request and response records.
//!
//! # Data Flow
//! ```text
//! inbound HTTP request
//!     → CanonicalRequest (http/request.rs)
//!     → control plane decision (resolution/)
//!     → ResponseSpec (partial)
//!     → materialize.rs (defaults applied)
//!     → CompletedResponse
//!     → written back (http/response.rs)
//! ```

pub mod materialize;
pub mod types;

pub use materialize::materialize;
pub use types::{
    CanonicalRequest, CompletedResponse, FieldMap, FieldValue, ResponseMode, ResponseSpec,
};
