#![allow(dead_code)]

use bunner_http_guard::constants::method;
use bunner_http_guard::{
    AllowedHeaders, AllowedMethods, Cors, CorsDecision, CorsOptions, ExposedHeaders,
    RequestContext,
};
use std::time::Duration;

pub const HOST: &str = "api.example.com";

pub struct PolicyBuilder {
    options: CorsOptions,
}

impl PolicyBuilder {
    pub fn new() -> Self {
        Self {
            options: CorsOptions::new(),
        }
    }

    pub fn origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = self.options.allow_origins(origins);
        self
    }

    pub fn allow_all(mut self) -> Self {
        self.options = self.options.allow_all_origins(true);
        self
    }

    pub fn predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.options = self.options.allow_origin_fn(predicate);
        self
    }

    pub fn context_predicate<F>(mut self, predicate: F) -> Self
    where
        F: for<'a> Fn(&RequestContext<'a>, &str) -> bool + Send + Sync + 'static,
    {
        self.options = self.options.allow_origin_with_context_fn(predicate);
        self
    }

    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = self.options.methods(AllowedMethods::list(methods));
        self
    }

    pub fn allowed_headers(mut self, headers: AllowedHeaders) -> Self {
        self.options = self.options.allowed_headers(headers);
        self
    }

    pub fn exposed_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = self.options.exposed_headers(ExposedHeaders::list(headers));
        self
    }

    pub fn credentials(mut self, enabled: bool) -> Self {
        self.options = self.options.credentials(enabled);
        self
    }

    pub fn max_age_secs(mut self, seconds: u64) -> Self {
        self.options = self.options.max_age(Some(Duration::from_secs(seconds)));
        self
    }

    pub fn status(mut self, status: u16) -> Self {
        self.options = self.options.options_success_status(status);
        self
    }

    pub fn private_network(mut self, enabled: bool) -> Self {
        self.options = self.options.allow_private_network(enabled);
        self
    }

    pub fn options(self) -> CorsOptions {
        self.options
    }

    pub fn build(self) -> Cors {
        Cors::new(self.options).expect("valid CORS configuration")
    }
}

pub struct RequestBuilder {
    method: String,
    host: String,
    path: String,
    origin: Option<String>,
}

impl RequestBuilder {
    fn new(method: &str) -> Self {
        Self {
            method: method.into(),
            host: HOST.into(),
            path: "/".into(),
            origin: None,
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn check(&self, cors: &Cors) -> CorsDecision {
        let ctx = RequestContext {
            method: &self.method,
            host: &self.host,
            path: &self.path,
            origin: self.origin.as_deref(),
        };
        cors.check(&ctx)
    }
}

pub fn policy() -> PolicyBuilder {
    PolicyBuilder::new()
}

pub fn simple_request() -> RequestBuilder {
    RequestBuilder::new(method::GET)
}

pub fn preflight_request() -> RequestBuilder {
    RequestBuilder::new(method::OPTIONS)
}
