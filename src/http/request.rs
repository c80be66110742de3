//! Canonical request construction.
//!
//! # Responsibilities
//! - Buffer the full request body (no timeout; a stalled body stalls the request)
//! - Split the request target into path and parsed query
//! - Capture peer address, method and headers
//!
//! # Design Decisions
//! - Body bytes are decoded as UTF-8, lossily
//! - Repeated query keys become lists; keys without `=` map to ""

use std::net::SocketAddr;

use http_body_util::BodyExt;
use hyper::body::Body;
use hyper::Request;

use crate::protocol::types::{header_fields, CanonicalRequest, FieldMap, FieldValue};

/// Build a [`CanonicalRequest`] once the body has been fully received.
///
/// Fails only if the body stream fails, e.g. the client disconnects.
pub async fn canonicalize<B>(request: Request<B>, peer: SocketAddr) -> Result<CanonicalRequest, B::Error>
where
    B: Body,
{
    let (parts, body) = request.into_parts();
    let bytes = body.collect().await?.to_bytes();

    Ok(CanonicalRequest {
        ip: peer.ip().to_string(),
        method: parts.method.as_str().to_string(),
        path: parts.uri.path().to_string(),
        query: parse_query(parts.uri.query().unwrap_or_default()),
        headers: header_fields(&parts.headers),
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// Parse a query string into a field map.
pub fn parse_query(query: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let value = value.into_owned();
        match fields.get_mut(key.as_ref()) {
            Some(existing) => existing.push(value),
            None => {
                fields.insert(key.into_owned(), FieldValue::One(value));
            }
        }
    }
    fields
}
