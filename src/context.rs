/// Borrowed view of the request attributes the CORS evaluator inspects.
#[derive(Debug, Clone)]
pub struct RequestContext<'a> {
    pub method: &'a str,
    /// Value of the request's own `Host` (authority), e.g. `api.example.com:8080`.
    pub host: &'a str,
    pub path: &'a str,
    pub origin: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn new(method: &'a str, host: &'a str) -> Self {
        Self {
            method,
            host,
            path: "/",
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: &'a str) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_path(mut self, path: &'a str) -> Self {
        self.path = path;
        self
    }
}
