use crate::constants::method;
use crate::util::is_http_token;

/// Configuration for the `Access-Control-Allow-Methods` response header.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum AllowedMethods {
    /// Emit the wildcard `*`.
    Any,
    /// Emit a comma-separated list of methods, upper-cased and de-duplicated.
    List(Vec<String>),
}

impl AllowedMethods {
    /// Construct an explicit list of allowed methods.
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut methods: Vec<String> = Vec::new();
        for value in values {
            let method = value.into().trim().to_ascii_uppercase();
            if !method.is_empty() && !methods.contains(&method) {
                methods.push(method);
            }
        }
        Self::List(methods)
    }

    pub fn any() -> Self {
        Self::Any
    }

    /// Returns the first entry that is not a valid HTTP method token.
    pub(crate) fn invalid_entry(&self) -> Option<&str> {
        match self {
            Self::Any => None,
            Self::List(values) => values
                .iter()
                .find(|value| !is_http_token(value))
                .map(String::as_str),
        }
    }

    pub fn header_value(&self) -> Option<String> {
        match self {
            Self::Any => Some("*".to_string()),
            Self::List(values) if values.is_empty() => None,
            Self::List(values) => Some(values.join(",")),
        }
    }
}

impl Default for AllowedMethods {
    fn default() -> Self {
        Self::list([
            method::GET,
            method::POST,
            method::PUT,
            method::PATCH,
            method::DELETE,
            method::HEAD,
            method::OPTIONS,
        ])
    }
}

#[cfg(test)]
#[path = "allowed_methods_test.rs"]
mod allowed_methods_test;
