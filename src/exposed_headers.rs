use crate::util::normalize_lower;
use std::collections::HashSet;

/// Configuration mirror of the `Access-Control-Expose-Headers` response header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExposedHeaders {
    #[default]
    None,
    List(Vec<String>),
    Any,
}

impl ExposedHeaders {
    /// Builds the list from the provided iterator, trimming whitespace and
    /// removing blank or duplicate entries. A lone `*` becomes [`Self::Any`].
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut deduped: Vec<String> = Vec::new();

        for value in values.into_iter() {
            let trimmed = value.into().trim().to_string();
            if trimmed.is_empty() {
                continue;
            }
            if seen.insert(normalize_lower(&trimmed)) {
                deduped.push(trimmed);
            }
        }

        match deduped.as_slice() {
            [] => Self::None,
            [only] if only == "*" => Self::Any,
            _ => Self::List(deduped),
        }
    }

    pub fn header_value(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::List(values) => Some(values.join(",")),
            Self::Any => Some("*".to_string()),
        }
    }
}

#[cfg(test)]
#[path = "exposed_headers_test.rs"]
mod exposed_headers_test;
