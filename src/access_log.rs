//! Access logging with panic recovery.
//!
//! [`AccessLogger::handle`] wraps a handler invocation: it times the call,
//! records a [`LogRecord`] through `tracing`, and turns a handler panic into a
//! 500 response (or the response produced by the `on_panic` hook).

use crate::constants::status;
use crate::util::truncate_utf8;
use regex_automata::meta::{BuildError, Regex};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use thiserror::Error;

pub type EndpointLabelFn = dyn for<'a> Fn(&LogRequest<'a>) -> String + Send + Sync;
pub type LogFormatterFn = dyn Fn(&LogRecord) -> String + Send + Sync;
pub type OnLogFn = dyn for<'a> Fn(&LogRequest<'a>, &LogRecord) + Send + Sync;
pub type OnPanicFn = dyn for<'a> Fn(&LogRequest<'a>, &LogRecord) -> LogResponse + Send + Sync;

/// Request attributes captured by the access logger.
#[derive(Debug, Clone, Default)]
pub struct LogRequest<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub raw_query: &'a str,
    pub client_ip: &'a str,
    pub proto: &'a str,
    pub user_agent: &'a str,
    pub referer: &'a str,
    pub request_id: &'a str,
    pub body: &'a [u8],
}

/// Status and body produced by the wrapped handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl LogResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// One access log entry.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: SystemTime,
    pub status: u16,
    pub latency: Duration,
    pub client_ip: String,
    pub method: String,
    /// Endpoint label, with `?query` appended when the request had one.
    pub path: String,
    /// Panic message, empty for normal completion.
    pub error_message: String,
    pub body_size: usize,
    pub request_data: String,
    pub response_data: String,
    pub user_agent: String,
    pub referer: String,
    pub proto: String,
    pub request_id: String,
}

/// Default single-line format: `status | latency | client ip | method "path" error`.
pub fn default_format(record: &LogRecord) -> String {
    let mut latency = record.latency;
    if latency > Duration::from_secs(60) {
        latency = Duration::from_secs(latency.as_secs());
    }

    format!(
        "{:3} | {:>8} | {:>15} | {:<7} {:?} {}",
        record.status,
        format!("{latency:?}"),
        record.client_ip,
        record.method,
        record.path,
        record.error_message,
    )
}

#[derive(Clone)]
pub struct AccessLogOptions {
    /// Regexes; a matching response status suppresses the log line.
    pub exclude_status: Vec<String>,
    /// Regexes matched against the endpoint label.
    pub exclude_endpoint: Vec<String>,
    /// Regexes matched against the request method.
    pub exclude_method: Vec<String>,
    pub endpoint_label: Option<Arc<EndpointLabelFn>>,
    pub formatter: Option<Arc<LogFormatterFn>>,
    pub on_log: Option<Arc<OnLogFn>>,
    pub on_panic: Option<Arc<OnPanicFn>>,
    pub request_body_limit: usize,
    pub response_body_limit: usize,
}

impl Default for AccessLogOptions {
    fn default() -> Self {
        Self {
            exclude_status: Vec::new(),
            exclude_endpoint: Vec::new(),
            exclude_method: Vec::new(),
            endpoint_label: None,
            formatter: None,
            on_log: None,
            on_panic: None,
            request_body_limit: usize::MAX,
            response_body_limit: usize::MAX,
        }
    }
}

impl AccessLogOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude_status<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_status = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude_endpoint<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_endpoint = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude_method<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_method = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn endpoint_label<F>(mut self, label: F) -> Self
    where
        F: for<'a> Fn(&LogRequest<'a>) -> String + Send + Sync + 'static,
    {
        self.endpoint_label = Some(Arc::new(label));
        self
    }

    pub fn formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&LogRecord) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn on_log<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&LogRequest<'a>, &LogRecord) + Send + Sync + 'static,
    {
        self.on_log = Some(Arc::new(hook));
        self
    }

    pub fn on_panic<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&LogRequest<'a>, &LogRecord) -> LogResponse + Send + Sync + 'static,
    {
        self.on_panic = Some(Arc::new(hook));
        self
    }

    pub fn request_body_limit(mut self, limit: usize) -> Self {
        self.request_body_limit = limit;
        self
    }

    pub fn response_body_limit(mut self, limit: usize) -> Self {
        self.response_body_limit = limit;
        self
    }
}

#[derive(Debug, Error)]
pub enum AccessLogError {
    #[error("invalid exclusion pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<BuildError>,
    },
}

pub struct AccessLogger {
    exclude_status: Vec<Regex>,
    exclude_endpoint: Vec<Regex>,
    exclude_method: Vec<Regex>,
    endpoint_label: Option<Arc<EndpointLabelFn>>,
    formatter: Arc<LogFormatterFn>,
    on_log: Option<Arc<OnLogFn>>,
    on_panic: Option<Arc<OnPanicFn>>,
    request_body_limit: usize,
    response_body_limit: usize,
}

impl AccessLogger {
    pub fn new(options: AccessLogOptions) -> Result<Self, AccessLogError> {
        Ok(Self {
            exclude_status: compile_patterns(&options.exclude_status)?,
            exclude_endpoint: compile_patterns(&options.exclude_endpoint)?,
            exclude_method: compile_patterns(&options.exclude_method)?,
            endpoint_label: options.endpoint_label,
            formatter: options
                .formatter
                .unwrap_or_else(|| Arc::new(default_format)),
            on_log: options.on_log,
            on_panic: options.on_panic,
            request_body_limit: options.request_body_limit,
            response_body_limit: options.response_body_limit,
        })
    }

    /// Runs `next`, logs the exchange and recovers from a panic inside it.
    pub fn handle<F>(&self, request: &LogRequest<'_>, next: F) -> LogResponse
    where
        F: FnOnce() -> LogResponse,
    {
        let started = Instant::now();
        let endpoint = self.endpoint(request);

        match panic::catch_unwind(AssertUnwindSafe(next)) {
            Ok(response) => {
                if self.is_excluded(response.status, &endpoint, request.method) {
                    return response;
                }

                let record = self.record(
                    request,
                    endpoint,
                    response.status,
                    &response.body,
                    started.elapsed(),
                    String::new(),
                );
                self.emit(&record);
                if let Some(on_log) = &self.on_log {
                    on_log(request, &record);
                }
                response
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(
                    error = %message,
                    method = request.method,
                    path = request.path,
                    "handler panicked"
                );

                let excluded =
                    self.is_excluded(status::INTERNAL_SERVER_ERROR, &endpoint, request.method);
                let record = self.record(
                    request,
                    endpoint,
                    status::INTERNAL_SERVER_ERROR,
                    &[],
                    started.elapsed(),
                    message.clone(),
                );
                if !excluded {
                    self.emit(&record);
                }

                match &self.on_panic {
                    Some(on_panic) => on_panic(request, &record),
                    None => LogResponse::new(status::INTERNAL_SERVER_ERROR, message),
                }
            }
        }
    }

    fn endpoint(&self, request: &LogRequest<'_>) -> String {
        match &self.endpoint_label {
            Some(label) => label(request),
            None => request.path.to_owned(),
        }
    }

    fn is_excluded(&self, status: u16, endpoint: &str, method: &str) -> bool {
        let status = status.to_string();
        matches_any(&self.exclude_status, &status)
            || matches_any(&self.exclude_endpoint, endpoint)
            || matches_any(&self.exclude_method, method)
    }

    fn record(
        &self,
        request: &LogRequest<'_>,
        endpoint: String,
        status: u16,
        response_body: &[u8],
        latency: Duration,
        error_message: String,
    ) -> LogRecord {
        let path = if request.raw_query.is_empty() {
            endpoint
        } else {
            format!("{endpoint}?{}", request.raw_query)
        };

        LogRecord {
            timestamp: SystemTime::now(),
            status,
            latency,
            client_ip: request.client_ip.to_owned(),
            method: request.method.to_owned(),
            path,
            error_message,
            body_size: response_body.len(),
            request_data: capture_body("request", request.body, self.request_body_limit),
            response_data: capture_body("response", response_body, self.response_body_limit),
            user_agent: request.user_agent.to_owned(),
            referer: request.referer.to_owned(),
            proto: request.proto.to_owned(),
            request_id: request.request_id.to_owned(),
        }
    }

    fn emit(&self, record: &LogRecord) {
        let line = (self.formatter)(record);
        tracing::debug!(
            status = record.status,
            method = %record.method,
            path = %record.path,
            client_ip = %record.client_ip,
            latency = ?record.latency,
            request_id = %record.request_id,
            "{line}"
        );
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, AccessLogError> {
    patterns
        .iter()
        .filter(|pattern| !pattern.is_empty())
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| AccessLogError::InvalidPattern {
                pattern: pattern.clone(),
                source: Box::new(source),
            })
        })
        .collect()
}

fn matches_any(patterns: &[Regex], label: &str) -> bool {
    patterns.iter().any(|pattern| pattern.is_match(label))
}

fn capture_body(kind: &str, body: &[u8], limit: usize) -> String {
    if body.len() <= limit {
        return String::from_utf8_lossy(body).into_owned();
    }

    format!(
        "{kind} data is too large, limit size: {limit}\n{}",
        truncate_utf8(body, limit)
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_owned())
}

#[cfg(test)]
#[path = "access_log_test.rs"]
mod access_log_test;
