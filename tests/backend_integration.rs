//! Integration tests for the HTTP backend gateway.

use portal_status::{Backend, BackendError, HttpBackend, HttpTimeouts};
use serde_json::json;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;

#[tokio::test]
async fn test_validate_posts_token_as_form_and_decodes_payload() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/api/v1/campus/account/token/validate/"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("token=a%2Bb%26c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response_code": "AUTH_TOKEN_VALIDATION_SUCCESSFUL",
            "username": "alice",
            "radius_user_token": "r-1",
            "email": "alice@example.com",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri(), HttpTimeouts::default()).unwrap();
    let response = backend.validate("campus", "a+b&c").await.unwrap();

    assert!(response.is_successful());
    assert_eq!(response.username.as_deref(), Some("alice"));
    assert_eq!(response.radius_user_token.as_deref(), Some("r-1"));
}

#[tokio::test]
async fn test_validate_failure_discriminant_is_not_an_error() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/api/v1/campus/account/token/validate/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"response_code": "INVALID_AUTH_TOKEN"})),
        )
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri(), HttpTimeouts::default()).unwrap();
    let response = backend.validate("campus", "stale").await.unwrap();

    assert!(!response.is_successful());
    assert_eq!(response.username, None);
}

#[tokio::test]
async fn test_validate_non_json_body_is_decode_error() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri(), HttpTimeouts::default()).unwrap();
    let err = backend.validate("campus", "t").await.unwrap_err();

    assert!(matches!(err, BackendError::Decode { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_validate_http_error_status() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri(), HttpTimeouts::default()).unwrap();
    let err = backend.validate("campus", "t").await.unwrap_err();

    assert!(
        matches!(err, BackendError::HttpStatus { status: 401, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_list_sessions_returns_records_in_order() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/api/v1/campus/account/session/"))
        .and(body_string("token=t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"session_id": 2, "nas_ip_address": "10.0.0.1"},
            {"session_id": 1, "nas_ip_address": "10.0.0.2"},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri(), HttpTimeouts::default()).unwrap();
    let sessions = backend.list_sessions("campus", "t").await.unwrap();

    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0]["session_id"], 2);
    assert_eq!(sessions[1]["nas_ip_address"], "10.0.0.2");
}

#[tokio::test]
async fn test_custom_paths_are_used() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/radius/campus/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::with_paths(
        &server.uri(),
        "/radius/{orgSlug}/validate",
        "/radius/{orgSlug}/sessions",
        HttpTimeouts::default(),
    )
    .unwrap();
    let sessions = backend.list_sessions("campus", "t").await.unwrap();

    assert!(sessions.is_empty());
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let backend = HttpBackend::new(
        "http://127.0.0.1:9",
        HttpTimeouts {
            connect_secs: 1,
            read_secs: 2,
        },
    )
    .unwrap();
    let err = backend.validate("campus", "t").await.unwrap_err();

    assert!(matches!(err, BackendError::Network { .. }), "got: {err:?}");
}
