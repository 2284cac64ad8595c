//! API Router and Application State
//!
//! Central routing configuration and shared state.

use axum::{extract::State, middleware::from_fn_with_state, routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{self, AuthUser, ZaloClient};
use crate::config::Config;
use crate::identity::IdentityClient;

/// Shared application state.
///
/// All members are stateless connection handles, safe for concurrent reuse;
/// there is no shared mutable in-process state between requests.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Identity provider client
    pub identity: IdentityClient,
    /// Zalo Graph API client
    pub zalo: ZaloClient,
    /// Server configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(db: PgPool, identity: IdentityClient, zalo: ZaloClient, config: Config) -> Self {
        Self {
            db,
            identity,
            zalo,
            config: Arc::new(config),
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Routes behind the bearer-token gate
    let protected_routes = Router::new()
        .route("/helloworld2", get(helloworld))
        .layer(from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Auth routes
        .nest("/auth", auth::router())
        // Protected sample route
        .merge(protected_routes)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Health check endpoint.
async fn health_check(State(_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Greeting response for the sample authenticated endpoint.
#[derive(Debug, Serialize)]
pub struct HelloResponse {
    /// Greeting interpolating the resolved identity.
    pub message: String,
    /// The authenticated account.
    pub user: AuthUser,
}

/// Sample endpoint behind the bearer-token gate.
///
/// GET /helloworld2
pub async fn helloworld(auth_user: AuthUser) -> Json<HelloResponse> {
    let who = auth_user
        .email
        .clone()
        .unwrap_or_else(|| auth_user.id.clone());
    Json(HelloResponse {
        message: format!("Hello, {who}!"),
        user: auth_user,
    })
}
