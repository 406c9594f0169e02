use crate::allowed_headers::AllowedHeaders;
use crate::allowed_methods::AllowedMethods;
use crate::constants::{scheme, status};
use crate::context::RequestContext;
use crate::exposed_headers::ExposedHeaders;
use crate::origin::{OriginContextPredicateFn, OriginEntry, OriginPredicateFn};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Raw CORS configuration, validated and compiled by [`crate::Cors::new`].
#[derive(Clone)]
pub struct CorsOptions {
    pub allow_all_origins: bool,
    /// Exact origins (`scheme://host[:port]`), patterns with a single `*`, or the literal `*`.
    pub allow_origins: Vec<String>,
    /// Consulted when neither exact nor wildcard entries match.
    pub allow_origin_fn: Option<Arc<OriginPredicateFn>>,
    /// Consulted last, with access to the request.
    pub allow_origin_with_context_fn: Option<Arc<OriginContextPredicateFn>>,
    pub methods: AllowedMethods,
    pub allowed_headers: AllowedHeaders,
    pub exposed_headers: ExposedHeaders,
    pub credentials: bool,
    pub max_age: Option<Duration>,
    /// Status for successful preflights; `0` falls back to 204.
    pub options_success_status: u16,
    pub allow_wildcard: bool,
    pub allow_browser_extensions: bool,
    pub allow_web_sockets: bool,
    pub allow_files: bool,
    pub allow_private_network: bool,
}

impl Default for CorsOptions {
    fn default() -> Self {
        Self {
            allow_all_origins: false,
            allow_origins: Vec::new(),
            allow_origin_fn: None,
            allow_origin_with_context_fn: None,
            methods: AllowedMethods::default(),
            allowed_headers: AllowedHeaders::default(),
            exposed_headers: ExposedHeaders::default(),
            credentials: false,
            max_age: Some(Duration::from_secs(12 * 60 * 60)),
            options_success_status: status::NO_CONTENT,
            allow_wildcard: true,
            allow_browser_extensions: false,
            allow_web_sockets: false,
            allow_files: false,
            allow_private_network: false,
        }
    }
}

impl CorsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_all_origins(mut self, enabled: bool) -> Self {
        self.allow_all_origins = enabled;
        self
    }

    pub fn allow_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    pub fn allow_origin_fn<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.allow_origin_fn = Some(Arc::new(predicate));
        self
    }

    pub fn allow_origin_with_context_fn<F>(mut self, predicate: F) -> Self
    where
        F: for<'a> Fn(&RequestContext<'a>, &str) -> bool + Send + Sync + 'static,
    {
        self.allow_origin_with_context_fn = Some(Arc::new(predicate));
        self
    }

    pub fn methods(mut self, methods: AllowedMethods) -> Self {
        self.methods = methods;
        self
    }

    pub fn allowed_headers(mut self, headers: AllowedHeaders) -> Self {
        self.allowed_headers = headers;
        self
    }

    pub fn exposed_headers(mut self, headers: ExposedHeaders) -> Self {
        self.exposed_headers = headers;
        self
    }

    pub fn credentials(mut self, enabled: bool) -> Self {
        self.credentials = enabled;
        self
    }

    pub fn max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn options_success_status(mut self, status: u16) -> Self {
        self.options_success_status = status;
        self
    }

    pub fn allow_wildcard(mut self, enabled: bool) -> Self {
        self.allow_wildcard = enabled;
        self
    }

    pub fn allow_browser_extensions(mut self, enabled: bool) -> Self {
        self.allow_browser_extensions = enabled;
        self
    }

    pub fn allow_web_sockets(mut self, enabled: bool) -> Self {
        self.allow_web_sockets = enabled;
        self
    }

    pub fn allow_files(mut self, enabled: bool) -> Self {
        self.allow_files = enabled;
        self
    }

    pub fn allow_private_network(mut self, enabled: bool) -> Self {
        self.allow_private_network = enabled;
        self
    }

    /// Origin scheme prefixes accepted by this configuration.
    pub fn schemes(&self) -> Vec<&'static str> {
        let mut schemes = scheme::DEFAULT.to_vec();
        if self.allow_browser_extensions {
            schemes.extend_from_slice(scheme::EXTENSION);
        }
        if self.allow_web_sockets {
            schemes.extend_from_slice(scheme::WEB_SOCKET);
        }
        if self.allow_files {
            schemes.extend_from_slice(scheme::FILE);
        }
        schemes
    }

    /// Parses every origin entry, returning them classified.
    pub(crate) fn origin_entries(&self) -> Result<Vec<OriginEntry>, ValidationError> {
        let schemes = self.schemes();
        self.allow_origins
            .iter()
            .map(|origin| OriginEntry::parse(origin, &schemes, self.allow_wildcard))
            .collect()
    }

    pub(crate) fn allows_all_origins(&self) -> bool {
        self.allow_all_origins || self.allow_origins.iter().any(|origin| origin.trim() == "*")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let allow_all = self.allows_all_origins();

        if allow_all && self.credentials {
            return Err(ValidationError::CredentialsRequireSpecificOrigin);
        }

        if !allow_all
            && self.allow_origins.is_empty()
            && self.allow_origin_fn.is_none()
            && self.allow_origin_with_context_fn.is_none()
        {
            return Err(ValidationError::NoOriginAllowed);
        }

        if self.allowed_headers.contains_wildcard() {
            return Err(ValidationError::AllowedHeadersListCannotContainWildcard);
        }

        if let Some(method) = self.methods.invalid_entry() {
            return Err(ValidationError::InvalidMethod {
                method: method.to_owned(),
            });
        }

        self.origin_entries().map(|_| ())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "credentials cannot be combined with allowing all origins; list the permitted origins explicitly"
    )]
    CredentialsRequireSpecificOrigin,
    #[error("no origin is allowed: configure allow_origins, allow_all_origins or an origin predicate")]
    NoOriginAllowed,
    #[error("bad origin `{origin}`: origins must be `scheme://host[:port]` with a permitted scheme")]
    InvalidOrigin { origin: String },
    #[error("bad origin `{origin}`: only one `*` is allowed per origin")]
    MultipleWildcards { origin: String },
    #[error("bad origin `{origin}`: wildcard origins are disabled")]
    WildcardNotAllowed { origin: String },
    #[error("allowed headers list cannot contain `*`; use AllowedHeaders::any() instead")]
    AllowedHeadersListCannotContainWildcard,
    #[error("`{method}` is not a valid HTTP method token")]
    InvalidMethod { method: String },
}

#[cfg(test)]
#[path = "options_test.rs"]
mod options_test;
