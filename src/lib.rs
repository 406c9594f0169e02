pub mod access_log;
mod allowed_headers;
mod allowed_methods;
pub mod constants;
mod context;
mod cors;
mod exposed_headers;
mod header_builder;
mod headers;
pub mod ip_allowlist;
mod options;
mod origin;
mod result;
mod util;

pub use access_log::{
    AccessLogError, AccessLogOptions, AccessLogger, LogRecord, LogRequest, LogResponse,
};
pub use allowed_headers::AllowedHeaders;
pub use allowed_methods::AllowedMethods;
pub use context::RequestContext;
pub use cors::Cors;
pub use exposed_headers::ExposedHeaders;
pub use headers::Headers;
pub use ip_allowlist::{AllowedIp, IpAllowlist, IpAllowlistError, IpDecision};
pub use options::{CorsOptions, ValidationError};
pub use origin::{OriginContextPredicateFn, OriginPredicateFn, WildcardOrigin};
pub use result::{CorsDecision, PreflightResult, SimpleResult};
