use crate::constants::header;
use crate::headers::{HeaderCollection, Headers};
use crate::options::CorsOptions;

/// Precomputes the static header sets of a policy at construction time.
pub(crate) struct HeaderBuilder<'a> {
    options: &'a CorsOptions,
    allow_all_origins: bool,
}

impl<'a> HeaderBuilder<'a> {
    pub(crate) fn new(options: &'a CorsOptions, allow_all_origins: bool) -> Self {
        Self {
            options,
            allow_all_origins,
        }
    }

    /// Headers for non-preflight cross-origin responses.
    pub(crate) fn build_normal_headers(&self) -> Headers {
        let mut headers = HeaderCollection::with_estimate(4);
        headers.extend(self.build_credentials_header());
        headers.extend(self.build_exposed_headers());
        headers.extend(self.build_origin_headers(&[header::ORIGIN]));
        headers.into_headers()
    }

    /// Headers for successful `OPTIONS` preflight responses.
    pub(crate) fn build_preflight_headers(&self) -> Headers {
        let mut headers = HeaderCollection::with_estimate(7);
        headers.extend(self.build_credentials_header());
        headers.extend(self.build_methods_header());
        headers.extend(self.build_allowed_headers());
        headers.extend(self.build_max_age_header());
        headers.extend(self.build_private_network_header());
        headers.extend(self.build_origin_headers(&[
            header::ORIGIN,
            header::ACCESS_CONTROL_REQUEST_METHOD,
            header::ACCESS_CONTROL_REQUEST_HEADERS,
        ]));
        headers.into_headers()
    }

    /// Allow-all policies answer with `*`; the others vary on the listed request headers
    /// and echo the origin per request.
    fn build_origin_headers(&self, vary: &[&str]) -> HeaderCollection {
        let mut headers = HeaderCollection::with_estimate(1);
        if self.allow_all_origins {
            headers.push(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
        } else {
            headers.add_vary(vary.join(", "));
        }
        headers
    }

    fn build_credentials_header(&self) -> HeaderCollection {
        let mut headers = HeaderCollection::with_estimate(1);
        if self.options.credentials {
            headers.push(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, "true");
        }
        headers
    }

    fn build_methods_header(&self) -> HeaderCollection {
        let mut headers = HeaderCollection::with_estimate(1);
        if let Some(value) = self.options.methods.header_value() {
            headers.push(header::ACCESS_CONTROL_ALLOW_METHODS, value);
        }
        headers
    }

    fn build_allowed_headers(&self) -> HeaderCollection {
        let mut headers = HeaderCollection::with_estimate(1);
        if let Some(value) = self.options.allowed_headers.header_value() {
            headers.push(header::ACCESS_CONTROL_ALLOW_HEADERS, value);
        }
        headers
    }

    fn build_exposed_headers(&self) -> HeaderCollection {
        let mut headers = HeaderCollection::with_estimate(1);
        if let Some(value) = self.options.exposed_headers.header_value() {
            headers.push(header::ACCESS_CONTROL_EXPOSE_HEADERS, value);
        }
        headers
    }

    fn build_max_age_header(&self) -> HeaderCollection {
        let mut headers = HeaderCollection::with_estimate(1);
        if let Some(max_age) = self.options.max_age
            && max_age.as_secs() > 0
        {
            headers.push(header::ACCESS_CONTROL_MAX_AGE, max_age.as_secs().to_string());
        }
        headers
    }

    fn build_private_network_header(&self) -> HeaderCollection {
        let mut headers = HeaderCollection::with_estimate(1);
        if self.options.allow_private_network {
            headers.push(header::ACCESS_CONTROL_ALLOW_PRIVATE_NETWORK, "true");
        }
        headers
    }
}

#[cfg(test)]
#[path = "header_builder_test.rs"]
mod header_builder_test;
