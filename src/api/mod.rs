// API module entry
// Shows CRUD routes wrapped in the uniform JSON envelope

mod envelope;
mod form;
mod handlers;
pub mod types;

use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::store::StoreError;

use envelope::{Envelope, EnvelopeError, Reply};

/// Internal failure while answering a request
#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    Envelope(EnvelopeError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(e) => write!(f, "store error: {e}"),
            Self::Envelope(e) => write!(f, "envelope error: {e}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<EnvelopeError> for ApiError {
    fn from(e: EnvelopeError) -> Self {
        Self::Envelope(e)
    }
}

/// Routes served by the API
#[derive(Debug, PartialEq, Eq)]
enum Route<'a> {
    Index,
    Mirror(&'a str),
    Shows,
    Show(&'a str),
}

impl Route<'_> {
    const fn allowed_methods(&self) -> &'static str {
        match self {
            Self::Index | Self::Mirror(_) => "GET",
            Self::Shows => "GET, POST",
            Self::Show(_) => "GET, PUT, DELETE",
        }
    }
}

fn match_route(path: &str) -> Option<Route<'_>> {
    if path == "/" {
        return Some(Route::Index);
    }
    if path == "/shows" {
        return Some(Route::Shows);
    }
    if let Some(id) = single_segment(path, "/shows/") {
        return Some(Route::Show(id));
    }
    single_segment(path, "/mirror/").map(Route::Mirror)
}

/// The non-empty path segment following `prefix`, if there is exactly one
fn single_segment<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)
        .filter(|rest| !rest.is_empty() && !rest.contains('/'))
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let mut entry = state.config.logging.access_log.then(|| {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = format_version(req.version()).to_string();
        entry.referer = header_string(&req, "referer");
        entry.user_agent = header_string(&req, "user-agent");
        entry
    });

    logger::log_debug(&format!(
        "{} {} from {peer_addr}",
        req.method(),
        req.uri()
    ));

    let response = route_request(req, &state).await;

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.request_time = started.elapsed();
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch on path and method, then render the reply
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let server_name = state.config.http.server_name.as_str();
    let path = req.uri().path().to_string();

    let Some(route) = match_route(&path) else {
        return render(simple_reply(StatusCode::NOT_FOUND, "Not Found"), server_name, None);
    };

    let db = state.db.as_ref();
    let method = req.method().clone();
    let result = match (&method, &route) {
        (&Method::GET, Route::Index) => handlers::index(),
        (&Method::GET, Route::Mirror(name)) => handlers::mirror(&decode_segment(name)),
        (&Method::GET, Route::Shows) => handlers::list_shows(db),
        (&Method::GET, Route::Show(id)) => handlers::get_show(db, parse_id(id)),
        (&Method::DELETE, Route::Show(id)) => handlers::delete_show(db, parse_id(id)),
        (&Method::POST, Route::Shows) => match read_form(req, state).await {
            Ok(form) => handlers::create_show(db, form),
            Err(reply) => Ok(reply),
        },
        (&Method::PUT, Route::Show(id)) => {
            let id = parse_id(id);
            match read_form(req, state).await {
                Ok(form) => handlers::update_show(db, id, form),
                Err(reply) => Ok(reply),
            }
        }
        _ => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            return render(
                simple_reply(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"),
                server_name,
                Some(route.allowed_methods()),
            );
        }
    };

    match result {
        Ok(reply) => render(reply, server_name, None),
        Err(e) => {
            logger::log_error(&format!("{method} {path}: {e}"));
            render(
                simple_reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
                server_name,
                None,
            )
        }
    }
}

/// Accepted form body encodings
#[derive(Debug, PartialEq, Eq)]
enum FormEncoding {
    Urlencoded,
    Multipart(String),
}

/// Pick the body decoder from `Content-Type`; a missing header means urlencoded
fn form_encoding<B>(req: &Request<B>) -> Result<FormEncoding, Reply> {
    let Some(content_type) = header_string(req, "content-type") else {
        return Ok(FormEncoding::Urlencoded);
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "application/x-www-form-urlencoded" => Ok(FormEncoding::Urlencoded),
        "multipart/form-data" => multer::parse_boundary(&content_type)
            .map(FormEncoding::Multipart)
            .map_err(|e| simple_reply(StatusCode::BAD_REQUEST, &format!("Invalid form body: {e}"))),
        _ => {
            logger::log_warning(&format!("Unsupported form content type: {content_type}"));
            Err(simple_reply(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Unsupported Media Type",
            ))
        }
    }
}

/// Collect and decode a form body, enforcing `http.max_body_size`
async fn read_form<B>(req: Request<B>, state: &AppState) -> Result<form::ShowForm, Reply>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let max_body_size = state.config.http.max_body_size;
    let encoding = form_encoding(&req)?;

    if let Some(size) = content_length(&req) {
        if size > max_body_size {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            return Err(simple_reply(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large"));
        }
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let body = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<http_body_util::LengthLimitError>() => {
            logger::log_warning(&format!("Request body exceeded {max_body_size} bytes"));
            return Err(simple_reply(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large"));
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return Err(simple_reply(
                StatusCode::BAD_REQUEST,
                "Failed to read request body",
            ));
        }
    };

    let parsed = match encoding {
        FormEncoding::Urlencoded => form::parse_show_form(&body),
        FormEncoding::Multipart(boundary) => form::parse_multipart_form(&body, boundary).await,
    };
    parsed.map_err(|e| simple_reply(StatusCode::BAD_REQUEST, &format!("Invalid form body: {e}")))
}

/// Envelope without payload for router-level errors
fn simple_reply(status: StatusCode, message: &str) -> Reply {
    Reply {
        status,
        envelope: Envelope {
            code: status.as_u16(),
            success: status.is_success(),
            message: message.to_string(),
            result: None,
        },
    }
}

fn render(reply: Reply, server_name: &str, allow: Option<&str>) -> Response<Full<Bytes>> {
    http::build_json_response(reply.status, reply.to_json(), server_name, allow)
}

/// Ids that are not unsigned integers match no record
fn parse_id(raw: &str) -> Option<u64> {
    decode_segment(raw).parse().ok()
}

fn decode_segment(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

fn content_length<B>(req: &Request<B>) -> Option<u64> {
    let value = req.headers().get(hyper::header::CONTENT_LENGTH)?;
    match value.to_str().ok().and_then(|v| v.parse::<u64>().ok()) {
        Some(size) => Some(size),
        None => {
            logger::log_warning("Invalid Content-Length header, skipping size check");
            None
        }
    }
}

fn header_string<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn format_version(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
