//! Response defaulting.
//!
//! Each field is taken from the response if set, else from the configured
//! default response, else from the built-in fallback.

use crate::protocol::types::{CompletedResponse, ResponseSpec, DEFAULT_STATUS_CODE};

/// Fill every unset field of `spec` from `defaults` and the built-in fallbacks.
pub fn materialize(spec: ResponseSpec, defaults: &ResponseSpec) -> CompletedResponse {
    CompletedResponse {
        status_code: spec
            .status_code
            .or(defaults.status_code)
            .unwrap_or(DEFAULT_STATUS_CODE),
        headers: spec
            .headers
            .or_else(|| defaults.headers.clone())
            .unwrap_or_default(),
        body: spec
            .body
            .or_else(|| defaults.body.clone())
            .unwrap_or_default(),
        mode: spec.mode.or(defaults.mode).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::{FieldMap, FieldValue, ResponseMode};

    fn defaults() -> ResponseSpec {
        let mut headers = FieldMap::new();
        headers.insert("x-default".into(), FieldValue::from("yes"));
        ResponseSpec {
            status_code: Some(404),
            headers: Some(headers),
            body: None,
            mode: None,
            blocked: false,
        }
    }

    #[test]
    fn empty_spec_without_defaults_uses_fallbacks() {
        let response = materialize(ResponseSpec::default(), &ResponseSpec::default());
        assert_eq!(response.status_code, 200);
        assert!(response.headers.is_empty());
        assert_eq!(response.body, "");
        assert_eq!(response.mode, ResponseMode::Text);
    }

    #[test]
    fn defaults_fill_only_unset_fields() {
        let spec = ResponseSpec {
            status_code: Some(201),
            body: Some("ok".into()),
            ..Default::default()
        };
        let response = materialize(spec, &defaults());

        assert_eq!(response.status_code, 201);
        assert_eq!(response.body, "ok");
        assert_eq!(response.headers["x-default"], FieldValue::from("yes"));
        assert_eq!(response.mode, ResponseMode::Text);
    }

    #[test]
    fn present_headers_replace_default_headers_wholesale() {
        let mut headers = FieldMap::new();
        headers.insert("content-type".into(), FieldValue::from("text/plain"));
        let spec = ResponseSpec {
            headers: Some(headers.clone()),
            mode: Some(ResponseMode::Binary),
            ..Default::default()
        };
        let response = materialize(spec, &defaults());

        assert_eq!(response.headers, headers);
        assert_eq!(response.status_code, 404);
        assert_eq!(response.mode, ResponseMode::Binary);
    }

    #[test]
    fn materializing_twice_is_stable() {
        let once = materialize(
            ResponseSpec {
                body: Some("payload".into()),
                ..Default::default()
            },
            &defaults(),
        );
        let twice = materialize(once.clone().into(), &defaults());
        assert_eq!(once, twice);
    }
}
