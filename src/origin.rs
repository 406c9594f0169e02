use crate::context::RequestContext;
use crate::options::ValidationError;
use crate::util::{normalize_lower, trim_trailing_slash};
use url::Url;

pub type OriginPredicateFn = dyn Fn(&str) -> bool + Send + Sync;
pub type OriginContextPredicateFn = dyn for<'a> Fn(&RequestContext<'a>, &str) -> bool + Send + Sync;

const WILDCARD: &str = "*";

/// Allowed-origin entry containing a single `*`, split into the text before
/// and after it. A leading or trailing `*` is kept as the literal `"*"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardOrigin {
    prefix: String,
    suffix: String,
}

impl WildcardOrigin {
    /// Splits `pattern` around its first `*`. Callers guarantee exactly one is present.
    pub(crate) fn split(pattern: &str) -> Self {
        let (before, after) = pattern.split_once('*').unwrap_or((pattern, ""));
        let (prefix, suffix) = if before.is_empty() {
            (WILDCARD, after)
        } else if after.is_empty() {
            (before, WILDCARD)
        } else {
            (before, after)
        };

        Self {
            prefix: prefix.to_owned(),
            suffix: suffix.to_owned(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn matches(&self, origin: &str) -> bool {
        if self.prefix == WILDCARD {
            return origin.ends_with(&self.suffix);
        }
        if self.suffix == WILDCARD {
            return origin.starts_with(&self.prefix);
        }

        origin.len() >= self.prefix.len() + self.suffix.len()
            && origin.starts_with(&self.prefix)
            && origin.ends_with(&self.suffix)
    }
}

/// Classified allowed-origin configuration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OriginEntry {
    Any,
    Exact(String),
    Wildcard(WildcardOrigin),
}

impl OriginEntry {
    pub(crate) fn parse(
        raw: &str,
        schemes: &[&str],
        allow_wildcard: bool,
    ) -> Result<Self, ValidationError> {
        let entry = raw.trim();
        if entry == WILDCARD {
            return Ok(Self::Any);
        }

        match entry.matches('*').count() {
            0 => normalize_exact(entry, schemes).map(Self::Exact),
            1 if !allow_wildcard => Err(ValidationError::WildcardNotAllowed {
                origin: raw.to_owned(),
            }),
            1 => {
                let pattern = normalize_lower(trim_trailing_slash(entry));
                if (!pattern.starts_with('*') && !has_scheme(&pattern, schemes))
                    || has_extra_parts(&pattern)
                {
                    return Err(ValidationError::InvalidOrigin {
                        origin: raw.to_owned(),
                    });
                }
                Ok(Self::Wildcard(WildcardOrigin::split(&pattern)))
            }
            _ => Err(ValidationError::MultipleWildcards {
                origin: raw.to_owned(),
            }),
        }
    }
}

fn has_scheme(value: &str, schemes: &[&str]) -> bool {
    schemes.iter().any(|scheme| {
        value
            .get(..scheme.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
    })
}

/// Anything past `host[:port]` in a pattern: path, query, fragment or userinfo.
fn has_extra_parts(pattern: &str) -> bool {
    let authority = pattern
        .split_once("://")
        .map_or(pattern, |(_, authority)| authority);
    authority.contains(['/', '?', '#', '@'])
}

/// Normalizes `scheme://host[:port]`: lowercase scheme and host, default
/// port dropped, trailing slash dropped.
fn normalize_exact(entry: &str, schemes: &[&str]) -> Result<String, ValidationError> {
    let invalid = || ValidationError::InvalidOrigin {
        origin: entry.to_owned(),
    };

    if !has_scheme(entry, schemes) {
        return Err(invalid());
    }

    let url = Url::parse(entry).map_err(|_| invalid())?;
    let has_extra_parts = !matches!(url.path(), "" | "/")
        || url.query().is_some()
        || url.fragment().is_some()
        || !url.username().is_empty()
        || url.password().is_some();
    if has_extra_parts {
        return Err(invalid());
    }

    let host = url.host_str().map(normalize_lower).unwrap_or_default();
    let mut normalized = format!("{}://{}", url.scheme(), host);
    if let Some(port) = url.port() {
        normalized.push(':');
        normalized.push_str(&port.to_string());
    }

    Ok(normalized)
}

#[cfg(test)]
#[path = "origin_test.rs"]
mod origin_test;
