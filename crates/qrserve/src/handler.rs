//! The single request handler: parse, validate, encode, respond
//!
//! Every method and every path goes through the same pipeline; the split
//! between path-embedded fields and query/form fields happens inside
//! `EncodeRequest::parse`.

use bytes::Bytes;
use http::header::{self, HeaderValue};
use http::{HeaderMap, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use qrserve_core::{encode, EncodeRequest, Error, FormValues};

/// Handle one request end to end. The body is only read when it may carry
/// urlencoded form fields.
pub async fn handle(req: hyper::Request<Incoming>) -> Response<Full<Bytes>> {
    let (parts, body) = req.into_parts();

    let form_body = if is_urlencoded(&parts.headers) {
        match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(_) => Bytes::new(),
        }
    } else {
        Bytes::new()
    };

    respond(parts.uri.path(), parts.uri.query(), &form_body)
}

fn is_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

/// The request pipeline, separated from hyper's body type so it can be
/// exercised directly in tests.
pub fn respond(path: &str, query: Option<&str>, form_body: &[u8]) -> Response<Full<Bytes>> {
    let form = FormValues::from_query_and_body(query, form_body);
    match EncodeRequest::parse(path, &form).and_then(|req| encode(&req)) {
        Ok(png) => png_response(png),
        Err(err) => error_response(&err),
    }
}

fn png_response(png: Vec<u8>) -> Response<Full<Bytes>> {
    let mut res = Response::new(Full::new(Bytes::from(png)));
    res.headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
    res
}

fn error_response(err: &Error) -> Response<Full<Bytes>> {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    // Plain-text error body, newline-terminated.
    let mut res = Response::new(Full::new(Bytes::from(format!("{err}\n"))));
    *res.status_mut() = status;
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    res.headers_mut()
        .insert("x-content-type-options", HeaderValue::from_static("nosniff"));
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_bytes(res: Response<Full<Bytes>>) -> Bytes {
        res.into_body().collect().await.unwrap().to_bytes()
    }

    fn content_type(res: &Response<Full<Bytes>>) -> &str {
        res.headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn test_query_form_success() {
        let res = respond("/", Some("data=hello&size=200&q=H"), b"");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(content_type(&res), "image/png");

        let body = body_bytes(res).await;
        assert!(!body.is_empty());
        assert_eq!(&body[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[tokio::test]
    async fn test_path_form_matches_query_form() {
        // "aGVsbG8=" is base64 for "hello"
        let via_path = respond("/aGVsbG8=/200/L", None, b"");
        let via_query = respond("/", Some("data=hello&size=200&q=L"), b"");
        assert_eq!(via_path.status(), StatusCode::OK);
        assert_eq!(body_bytes(via_path).await, body_bytes(via_query).await);
    }

    #[tokio::test]
    async fn test_form_body_fallback() {
        let res = respond("/", None, b"data=hello&size=64");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(content_type(&res), "image/png");
    }

    #[tokio::test]
    async fn test_empty_data() {
        let res = respond("/", Some("data=&size=200"), b"");
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_bytes(res).await, "Data must not be empty\n");
    }

    #[tokio::test]
    async fn test_unparseable_size() {
        let res = respond("/", Some("data=hello&size=abc"), b"");
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_bytes(res).await;
        assert!(std::str::from_utf8(&body)
            .unwrap()
            .starts_with("Error parsing size:"));
    }

    #[tokio::test]
    async fn test_size_out_of_range() {
        let res = respond("/", Some("data=hello&size=5000"), b"");
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_bytes(res).await, "Invalid image size: 5000\n");
    }

    #[tokio::test]
    async fn test_client_errors_are_plain_text() {
        let res = respond("/", Some("data=&size=200"), b"");
        assert_eq!(content_type(&res), "text/plain; charset=utf-8");
    }

    #[tokio::test]
    async fn test_encoder_failure_is_server_error() {
        let huge = "a".repeat(8000);
        let query = format!("data={huge}&size=256");
        let res = respond("/", Some(&query), b"");
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_bytes(res).await;
        assert!(std::str::from_utf8(&body)
            .unwrap()
            .starts_with("Error creating QR code:"));
    }

    #[tokio::test]
    async fn test_repeated_requests_are_byte_identical() {
        let first = body_bytes(respond("/", Some("data=hello&size=100"), b"")).await;
        let second = body_bytes(respond("/", Some("data=hello&size=100"), b"")).await;
        assert_eq!(first, second);
    }
}
