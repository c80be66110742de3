//! Response rendering.
//!
//! # Responsibilities
//! - Turn a `CompletedResponse` into an HTTP response
//! - Decode binary-mode bodies from base64
//!
//! # Design Decisions
//! - Header names or values that are not valid HTTP are skipped with a warning
//! - Headers are written as given; hyper adds `content-length` when absent

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{Response, StatusCode};
use thiserror::Error;

use crate::protocol::types::{CompletedResponse, ResponseMode};

/// A completed response that cannot be written as HTTP.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid status code {0}")]
    InvalidStatus(u16),

    #[error("Binary body is not valid base64: {0}")]
    InvalidBinaryBody(#[from] base64::DecodeError),
}

/// Render `completed` as an HTTP response.
pub fn render(completed: &CompletedResponse) -> Result<Response<Full<Bytes>>, RenderError> {
    let status = StatusCode::from_u16(completed.status_code)
        .map_err(|_| RenderError::InvalidStatus(completed.status_code))?;

    let body = match completed.mode {
        ResponseMode::Text => Bytes::from(completed.body.clone().into_bytes()),
        ResponseMode::Binary => Bytes::from(STANDARD.decode(completed.body.as_bytes())?),
    };

    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    for (name, value) in &completed.headers {
        let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
            tracing::warn!(header = %name, "Skipping invalid response header name");
            continue;
        };
        for v in value.values() {
            match HeaderValue::from_str(v) {
                Ok(v) => {
                    headers.append(name.clone(), v);
                }
                Err(_) => tracing::warn!(header = %name, "Skipping invalid response header value"),
            }
        }
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::{FieldMap, FieldValue};
    use http_body_util::BodyExt;

    fn completed(body: &str, mode: ResponseMode) -> CompletedResponse {
        let mut headers = FieldMap::new();
        headers.insert("content-type".into(), FieldValue::from("text/plain"));
        headers.insert(
            "set-cookie".into(),
            FieldValue::Many(vec!["a=1".into(), "b=2".into()]),
        );
        CompletedResponse {
            status_code: 201,
            headers,
            body: body.to_string(),
            mode,
        }
    }

    async fn body_of(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn renders_text_response() {
        let response = render(&completed("ok", ResponseMode::Text)).unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["content-type"], "text/plain");
        assert_eq!(response.headers().get_all("set-cookie").iter().count(), 2);
        assert_eq!(body_of(response).await, "ok");
    }

    #[tokio::test]
    async fn decodes_binary_body() {
        let response = render(&completed("AAEC/w==", ResponseMode::Binary)).unwrap();
        assert_eq!(body_of(response).await.as_ref(), &[0x00u8, 0x01, 0x02, 0xff]);
    }

    #[test]
    fn rejects_bad_status_and_base64() {
        let mut bad_status = completed("", ResponseMode::Text);
        bad_status.status_code = 42;
        assert!(matches!(render(&bad_status), Err(RenderError::InvalidStatus(42))));

        assert!(matches!(
            render(&completed("not base64!", ResponseMode::Binary)),
            Err(RenderError::InvalidBinaryBody(_))
        ));
    }
}
