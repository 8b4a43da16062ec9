//! Access log format module
//!
//! Supported formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)
//! - Custom patterns with `$variables`

use chrono::Local;
use std::time::Duration;

const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Access log entry for one request/response pair
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: chrono::DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// HTTP version (1.0, 1.1, 2)
    pub http_version: String,
    pub status: u16,
    pub body_bytes: usize,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub request_time: Duration,
}

impl AccessLogEntry {
    /// Create a new access log entry stamped with the current time
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            request_time: Duration::ZERO,
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => format!(
                "{} \"{}\" \"{}\"",
                self.format_common(),
                self.referer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ),
            "common" => self.format_common(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    fn request_line(&self) -> String {
        format!(
            "{} {} HTTP/{}",
            self.method,
            self.request_uri(),
            self.http_version
        )
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": u64::try_from(self.request_time.as_micros()).unwrap_or(u64::MAX),
        })
        .to_string()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables:
    /// - `$remote_addr`, `$time_local`, `$time_iso8601`
    /// - `$request`, `$request_method`, `$request_uri`, `$request_time` (seconds, 3 decimals)
    /// - `$status`, `$body_bytes_sent`, `$http_referer`, `$http_user_agent`
    ///
    /// The pattern is scanned once, so `$` sequences inside substituted
    /// values (a request path, a user agent) are written as-is.
    fn format_custom(&self, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len() * 2);
        let mut rest = pattern;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            match CUSTOM_VARIABLES.iter().find(|(name, _)| tail.starts_with(name)) {
                Some((name, variable)) => {
                    out.push_str(&self.variable(*variable));
                    rest = &tail[name.len()..];
                }
                None => {
                    out.push('$');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }

    fn variable(&self, variable: Variable) -> String {
        match variable {
            Variable::RemoteAddr => self.remote_addr.clone(),
            Variable::TimeLocal => self.time.format(CLF_TIME).to_string(),
            Variable::TimeIso8601 => self.time.to_rfc3339(),
            Variable::Request => self.request_line(),
            Variable::RequestMethod => self.method.clone(),
            Variable::RequestUri => self.request_uri(),
            Variable::RequestTime => format!("{:.3}", self.request_time.as_secs_f64()),
            Variable::Status => self.status.to_string(),
            Variable::BodyBytesSent => self.body_bytes.to_string(),
            Variable::HttpReferer => self.referer.clone().unwrap_or_else(|| "-".to_string()),
            Variable::HttpUserAgent => self.user_agent.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Variable {
    RemoteAddr,
    TimeLocal,
    TimeIso8601,
    Request,
    RequestMethod,
    RequestUri,
    RequestTime,
    Status,
    BodyBytesSent,
    HttpReferer,
    HttpUserAgent,
}

// `$request` must come after the longer `$request_*` names
const CUSTOM_VARIABLES: &[(&str, Variable)] = &[
    ("$remote_addr", Variable::RemoteAddr),
    ("$time_local", Variable::TimeLocal),
    ("$time_iso8601", Variable::TimeIso8601),
    ("$request_method", Variable::RequestMethod),
    ("$request_uri", Variable::RequestUri),
    ("$request_time", Variable::RequestTime),
    ("$request", Variable::Request),
    ("$status", Variable::Status),
    ("$body_bytes_sent", Variable::BodyBytesSent),
    ("$http_referer", Variable::HttpReferer),
    ("$http_user_agent", Variable::HttpUserAgent),
];
