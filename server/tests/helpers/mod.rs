//! Reusable test helpers for HTTP integration tests.
//!
//! Provides builders for an `AppState` whose outbound clients point at
//! wiremock servers, plus utilities for sending requests through the full
//! axum router and decoding JSON bodies.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use zb_server::api::AppState;
use zb_server::auth::ZaloClient;
use zb_server::config::Config;
use zb_server::identity::IdentityClient;

/// Build an `AppState` with outbound clients pointed at the given base URLs.
///
/// The database pool is created lazily and never connects unless a test
/// actually reaches the persistence layer, so gate and upstream-rejection
/// tests run without infrastructure.
pub fn test_state(identity_base: &str, zalo_base: &str) -> AppState {
    let mut config = Config::default_for_test();
    config.supabase_url = identity_base.trim_end_matches('/').to_string();
    config.zalo_api_base = zalo_base.trim_end_matches('/').to_string();

    let db = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .expect("lazy pool should parse the database URL");

    let http = reqwest::Client::new();
    let identity = IdentityClient::new(
        http.clone(),
        &config.supabase_url,
        &config.supabase_anon_key,
        &config.supabase_service_role_key,
    );
    let zalo = ZaloClient::new(http, &config.zalo_api_base, &config.zalo_app_secret);

    AppState::new(db, identity, zalo, config)
}

/// Send a request through the router and decode the JSON body.
///
/// An empty body decodes as `Value::Null`.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("request should not error");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };

    (status, body)
}

/// Build a JSON POST request.
pub fn json_post(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}
