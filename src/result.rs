use crate::headers::Headers;

/// Headers and terminating status for an accepted `OPTIONS` preflight.
///
/// The adapter writes `headers`, ends the exchange with `status` and never
/// calls the downstream handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightResult {
    pub headers: Headers,
    pub status: u16,
}

/// Headers to add to the handler's response for an accepted normal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleResult {
    pub headers: Headers,
}

/// Overall decision returned by the policy engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsDecision {
    /// No `Origin` header, or a same-origin request: pass through untouched.
    NotApplicable,
    /// Origin not permitted: abort with `status` and emit no CORS headers.
    Rejected { status: u16 },
    Preflight(PreflightResult),
    Simple(SimpleResult),
}

impl CorsDecision {
    /// Whether the downstream handler should run.
    pub fn continues(&self) -> bool {
        matches!(self, Self::NotApplicable | Self::Simple(_))
    }
}
