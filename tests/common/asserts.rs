#![allow(dead_code)]

use bunner_http_guard::{CorsDecision, Headers};

pub fn assert_simple(decision: CorsDecision) -> Headers {
    match decision {
        CorsDecision::Simple(result) => result.headers,
        other => panic!("expected simple decision, got {:?}", other),
    }
}

pub fn assert_preflight(decision: CorsDecision) -> (Headers, u16) {
    match decision {
        CorsDecision::Preflight(result) => (result.headers, result.status),
        other => panic!("expected preflight decision, got {:?}", other),
    }
}

pub fn assert_rejected(decision: CorsDecision) {
    match decision {
        CorsDecision::Rejected { status } => assert_eq!(status, 403),
        other => panic!("expected rejection, got {:?}", other),
    }
}

pub fn assert_passthrough(decision: CorsDecision) {
    assert_eq!(decision, CorsDecision::NotApplicable);
}
