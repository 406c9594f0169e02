use crate::constants::{header, method, status};
use crate::context::RequestContext;
use crate::header_builder::HeaderBuilder;
use crate::headers::Headers;
use crate::options::{CorsOptions, ValidationError};
use crate::origin::{OriginContextPredicateFn, OriginEntry, OriginPredicateFn, WildcardOrigin};
use crate::result::{CorsDecision, PreflightResult, SimpleResult};
use crate::util::normalize_lower;
use indexmap::IndexSet;
use std::sync::Arc;

/// Core CORS policy engine built once from [`CorsOptions`].
///
/// Immutable after construction; share it across request tasks behind an `Arc`.
pub struct Cors {
    allow_all_origins: bool,
    allow_origins: IndexSet<String>,
    wildcard_origins: Vec<WildcardOrigin>,
    allow_origin_fn: Option<Arc<OriginPredicateFn>>,
    allow_origin_with_context_fn: Option<Arc<OriginContextPredicateFn>>,
    normal_headers: Headers,
    preflight_headers: Headers,
    options_success_status: u16,
}

impl Cors {
    pub fn new(options: CorsOptions) -> Result<Self, ValidationError> {
        options.validate()?;

        let allow_all_origins = options.allows_all_origins();
        let mut allow_origins = IndexSet::new();
        let mut wildcard_origins = Vec::new();
        for entry in options.origin_entries()? {
            match entry {
                OriginEntry::Any => {}
                OriginEntry::Exact(origin) => {
                    allow_origins.insert(origin);
                }
                OriginEntry::Wildcard(pattern) => {
                    if !wildcard_origins.contains(&pattern) {
                        wildcard_origins.push(pattern);
                    }
                }
            }
        }

        let builder = HeaderBuilder::new(&options, allow_all_origins);
        let normal_headers = builder.build_normal_headers();
        let preflight_headers = builder.build_preflight_headers();

        let options_success_status = match options.options_success_status {
            0 => status::NO_CONTENT,
            code => code,
        };

        tracing::debug!(
            allow_all_origins,
            exact_origins = allow_origins.len(),
            wildcard_origins = wildcard_origins.len(),
            credentials = options.credentials,
            "cors policy compiled"
        );

        Ok(Self {
            allow_all_origins,
            allow_origins,
            wildcard_origins,
            allow_origin_fn: options.allow_origin_fn,
            allow_origin_with_context_fn: options.allow_origin_with_context_fn,
            normal_headers,
            preflight_headers,
            options_success_status,
        })
    }

    pub fn check(&self, request: &RequestContext<'_>) -> CorsDecision {
        let Some(origin) = request.origin.filter(|origin| !origin.is_empty()) else {
            return CorsDecision::NotApplicable;
        };

        if is_same_origin(origin, request.host) {
            return CorsDecision::NotApplicable;
        }

        if !self.is_origin_allowed(request, origin) {
            tracing::debug!(origin, host = request.host, "cross-origin request rejected");
            return CorsDecision::Rejected {
                status: status::FORBIDDEN,
            };
        }

        if request.method == method::OPTIONS {
            CorsDecision::Preflight(PreflightResult {
                headers: self.with_allow_origin(&self.preflight_headers, origin),
                status: self.options_success_status,
            })
        } else {
            CorsDecision::Simple(SimpleResult {
                headers: self.with_allow_origin(&self.normal_headers, origin),
            })
        }
    }

    pub fn allows_all_origins(&self) -> bool {
        self.allow_all_origins
    }

    pub fn wildcard_origins(&self) -> &[WildcardOrigin] {
        &self.wildcard_origins
    }

    pub fn options_success_status(&self) -> u16 {
        self.options_success_status
    }

    fn is_origin_allowed(&self, request: &RequestContext<'_>, origin: &str) -> bool {
        self.matches_origin(origin)
            || self
                .allow_origin_with_context_fn
                .as_ref()
                .is_some_and(|predicate| predicate(request, origin))
    }

    fn matches_origin(&self, origin: &str) -> bool {
        if self.allow_all_origins {
            return true;
        }

        let normalized = normalize_request_origin(origin);
        if self.allow_origins.contains(&normalized) {
            return true;
        }

        if self
            .wildcard_origins
            .iter()
            .any(|pattern| pattern.matches(&normalized))
        {
            return true;
        }

        self.allow_origin_fn
            .as_ref()
            .is_some_and(|predicate| predicate(origin))
    }

    fn with_allow_origin(&self, base: &Headers, origin: &str) -> Headers {
        let mut headers = base.clone();
        if !self.allow_all_origins {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_ORIGIN.to_string(),
                origin.to_string(),
            );
        }
        headers
    }
}

const DEFAULT_PORTS: &[(&str, &str)] = &[
    ("http://", ":80"),
    ("https://", ":443"),
    ("ws://", ":80"),
    ("wss://", ":443"),
];

/// Lowercases a request `Origin` and drops an explicit default port, matching
/// how configured entries are stored.
fn normalize_request_origin(origin: &str) -> String {
    let mut normalized = normalize_lower(origin);
    let default_port = DEFAULT_PORTS
        .iter()
        .find(|(scheme, port)| normalized.starts_with(scheme) && normalized.ends_with(port))
        .map(|(_, port)| port.len());
    if let Some(port_len) = default_port {
        normalized.truncate(normalized.len() - port_len);
    }
    normalized
}

/// `Origin` equal to `http://{host}` or `https://{host}`; unparsable values never match.
fn is_same_origin(origin: &str, host: &str) -> bool {
    if host.is_empty() {
        return false;
    }

    ["http://", "https://"].iter().any(|scheme| {
        origin
            .get(..scheme.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
            && origin
                .get(scheme.len()..)
                .is_some_and(|rest| rest.eq_ignore_ascii_case(host))
    })
}

#[cfg(test)]
#[path = "cors_test.rs"]
mod cors_test;
