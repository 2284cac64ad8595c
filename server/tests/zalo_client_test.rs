//! Zalo Graph API client tests against a wiremock upstream.
//!
//! Run with: `cargo test --test zalo_client_test`

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zb_server::auth::{appsecret_proof, ZaloClient, ZaloError};

const APP_SECRET: &str = "test-zalo-secret";

fn client(server: &MockServer) -> ZaloClient {
    ZaloClient::new(reqwest::Client::new(), &server.uri(), APP_SECRET)
}

#[tokio::test]
async fn test_fetch_profile_sends_token_and_proof() {
    let server = MockServer::start().await;
    let token = "zalo-access-token";

    Mock::given(method("GET"))
        .and(path("/v2.0/me"))
        .and(query_param("fields", "id,name,birthday,picture"))
        .and(header("access_token", token))
        .and(header("appsecret_proof", appsecret_proof(token, APP_SECRET).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": 0,
            "id": "8401031490870276093",
            "name": "Nguyen Van A",
            "picture": { "data": { "url": "https://example.test/a.jpg" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let profile = client(&server)
        .fetch_profile(token)
        .await
        .expect("profile fetch should succeed");

    assert_eq!(profile.id, "8401031490870276093");
    assert_eq!(profile.name.as_deref(), Some("Nguyen Van A"));
}

#[tokio::test]
async fn test_fetch_profile_error_body_is_rejected() {
    let server = MockServer::start().await;

    // Zalo reports in-band failure with HTTP 200 and a non-zero error code
    Mock::given(method("GET"))
        .and(path("/v2.0/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": -201,
            "message": "Access token is invalid"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_profile("bad-token")
        .await
        .expect_err("error body should fail the exchange");

    match err {
        ZaloError::Rejected { status, message } => {
            assert_eq!(status, 200);
            assert_eq!(message, "Access token is invalid");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_profile_http_error_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2.0/me"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Bad Request"))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_profile("bad-token")
        .await
        .expect_err("HTTP 400 should fail the exchange");

    match err {
        ZaloError::Rejected { status, .. } => assert_eq!(status, 400),
        other => panic!("expected Rejected, got {other:?}"),
    }
}
