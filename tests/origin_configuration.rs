mod common;

use bunner_http_guard::constants::header;
use bunner_http_guard::{Cors, CorsOptions, ValidationError};
use common::asserts::{assert_passthrough, assert_rejected, assert_simple};
use common::builders::{policy, simple_request};
use common::headers::{has_header, header_value, vary_values};

#[test]
fn should_echo_exact_origin_with_vary() {
    let cors = policy().origins(["https://example.com"]).build();

    let headers = assert_simple(simple_request().origin("https://example.com").check(&cors));

    assert_eq!(
        header_value(&headers, header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some("https://example.com")
    );
    assert!(vary_values(&headers).contains(header::ORIGIN));
}

#[test]
fn should_match_entry_written_with_trailing_slash_and_uppercase() {
    let cors = policy().origins(["HTTPS://Example.com/"]).build();

    let headers = assert_simple(simple_request().origin("https://example.com").check(&cors));

    assert_eq!(
        header_value(&headers, header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some("https://example.com")
    );
}

#[test]
fn should_match_entry_written_with_default_port() {
    let cors = policy().origins(["https://example.com:443"]).build();

    assert_simple(simple_request().origin("https://example.com").check(&cors));
    assert_rejected(simple_request().origin("https://example.com:8443").check(&cors));
}

#[test]
fn should_match_request_origin_sent_with_default_port() {
    let cors = policy()
        .origins(["https://example.com", "http://*.example.org"])
        .build();

    let headers = assert_simple(
        simple_request()
            .origin("https://Example.com:443")
            .check(&cors),
    );
    assert_eq!(
        header_value(&headers, header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some("https://Example.com:443")
    );
    assert_simple(simple_request().origin("http://api.example.org:80").check(&cors));
    assert_rejected(simple_request().origin("https://example.com:80").check(&cors));
}

#[test]
fn should_accept_subdomain_and_reject_apex_for_wildcard_pattern() {
    let cors = policy().origins(["https://*.example.com"]).build();

    let headers = assert_simple(
        simple_request()
            .origin("https://api.example.com")
            .check(&cors),
    );
    assert_eq!(
        header_value(&headers, header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some("https://api.example.com")
    );

    assert_rejected(simple_request().origin("https://example.com").check(&cors));
}

#[test]
fn should_accept_any_port_for_trailing_wildcard() {
    let cors = policy().origins(["http://localhost:*"]).build();

    assert_simple(simple_request().origin("http://localhost:5173").check(&cors));
    assert_rejected(simple_request().origin("http://localhost.evil.test").check(&cors));
}

#[test]
fn should_consult_predicate_after_lists() {
    let cors = policy()
        .origins(["https://listed.test"])
        .predicate(|origin| origin == "https://special.test")
        .build();

    assert_simple(simple_request().origin("https://listed.test").check(&cors));
    assert_simple(simple_request().origin("https://special.test").check(&cors));
    assert_rejected(simple_request().origin("https://other.test").check(&cors));
}

#[test]
fn should_consult_context_predicate_last() {
    let cors = policy()
        .predicate(|_| false)
        .context_predicate(|ctx, origin| ctx.path.starts_with("/public") && origin.starts_with("https://"))
        .build();

    assert_simple(
        simple_request()
            .path("/public/feed")
            .origin("https://reader.test")
            .check(&cors),
    );
    assert_rejected(
        simple_request()
            .path("/private")
            .origin("https://reader.test")
            .check(&cors),
    );
}

#[test]
fn should_answer_star_for_allow_all() {
    let cors = policy().allow_all().build();

    for origin in ["https://a.test", "http://b.test:9000", "null"] {
        let headers = assert_simple(simple_request().origin(origin).check(&cors));

        assert_eq!(
            header_value(&headers, header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some("*")
        );
        assert!(!has_header(&headers, header::VARY));
    }
}

#[test]
fn should_treat_star_entry_like_allow_all_flag() {
    let from_entry = policy().origins(["*"]).build();
    let from_flag = policy().allow_all().build();

    let request = simple_request().origin("https://anything.test");

    assert_eq!(request.check(&from_entry), request.check(&from_flag));
}

#[test]
fn should_pass_through_same_origin_requests() {
    let cors = policy().origins(["https://other.test"]).build();

    assert_passthrough(simple_request().origin("https://api.example.com").check(&cors));
    assert_passthrough(simple_request().origin("http://api.example.com").check(&cors));
}

#[test]
fn should_reject_malformed_origin_header() {
    let cors = policy().origins(["https://example.com"]).build();

    assert_rejected(simple_request().origin("not a url").check(&cors));
}

#[test]
fn should_fail_construction_for_double_wildcard() {
    let result = Cors::new(CorsOptions::new().allow_origins(["https://*.*.example.com"]));

    assert!(matches!(
        result,
        Err(ValidationError::MultipleWildcards { origin }) if origin == "https://*.*.example.com"
    ));
}

#[test]
fn should_fail_construction_for_wildcard_pattern_with_path_or_query() {
    let result = Cors::new(CorsOptions::new().allow_origins(["https://*.example.com/api?x=1"]));

    assert!(matches!(
        result,
        Err(ValidationError::InvalidOrigin { origin }) if origin == "https://*.example.com/api?x=1"
    ));
}

#[test]
fn should_fail_construction_for_allow_all_with_credentials() {
    let result = Cors::new(policy().allow_all().credentials(true).options());

    assert!(matches!(
        result,
        Err(ValidationError::CredentialsRequireSpecificOrigin)
    ));
}

#[test]
fn should_accept_extension_origins_only_when_enabled() {
    let entries = ["chrome-extension://abcdefghijklmnop"];

    assert!(matches!(
        Cors::new(CorsOptions::new().allow_origins(entries)),
        Err(ValidationError::InvalidOrigin { .. })
    ));

    let cors = Cors::new(
        CorsOptions::new()
            .allow_origins(entries)
            .allow_browser_extensions(true),
    )
    .expect("valid CORS configuration");

    assert_simple(
        simple_request()
            .origin("chrome-extension://abcdefghijklmnop")
            .check(&cors),
    );
}
