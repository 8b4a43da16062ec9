//! HTTP response building module
//!
//! Turns serialized bodies into hyper responses, decoupled from the API layer.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

/// Body used when a proper envelope cannot be produced
pub const INTERNAL_ERROR_BODY: &str =
    r#"{"code":500,"success":false,"message":"Internal server error","result":null}"#;

/// Build a JSON response
///
/// `allow` is set on 405 responses to list the methods the path accepts.
pub fn build_json_response(
    status: StatusCode,
    json: String,
    server_name: &str,
    allow: Option<&str>,
) -> Response<Full<Bytes>> {
    let content_length = json.len();
    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Content-Length", content_length)
        .header("Server", server_name);

    if let Some(methods) = allow {
        builder = builder.header("Allow", methods);
    }

    builder.body(Full::new(Bytes::from(json))).unwrap_or_else(|e| {
        log_build_error(status, &e);
        build_500_response()
    })
}

/// Build 500 Internal Server Error response with a static envelope
pub fn build_500_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(
        INTERNAL_ERROR_BODY.as_bytes(),
    )));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    response
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
