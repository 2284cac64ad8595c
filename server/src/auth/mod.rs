//! Authentication Service
//!
//! The Zalo login exchange and the bearer-token gate.

mod error;
mod handlers;
mod middleware;
mod zalo;

use axum::{routing::post, Router};

use crate::api::AppState;

pub use error::{AuthError, AuthResult};
pub use handlers::{UserResponse, ZaloLoginRequest, ZaloLoginResponse};
pub use middleware::{require_auth, AuthUser};
pub use zalo::{appsecret_proof, ZaloClient, ZaloError, ZaloProfile};

/// Create authentication router.
///
/// Public routes (no auth required):
/// - POST /zalo - Exchange a Zalo access token for a user + session
/// - OPTIONS /zalo - CORS preflight
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/zalo",
        post(handlers::zalo_login).options(handlers::zalo_preflight),
    )
}
