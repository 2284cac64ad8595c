//! Authentication Middleware
//!
//! The bearer-token gate: validates the Authorization header against the
//! identity provider on every request, with no caching of verification
//! results.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use crate::api::AppState;
use crate::identity::IdentityUser;

use super::error::AuthError;

/// Authenticated identity injected into request extensions.
///
/// This is a minimal struct containing only safe-to-expose account data.
/// Use this in handlers to access the current user.
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    /// Provider-side account ID.
    pub id: String,
    /// Account email (if set).
    pub email: Option<String>,
}

impl From<IdentityUser> for AuthUser {
    fn from(user: IdentityUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// Middleware to require authentication.
///
/// Extracts the Bearer token from the Authorization header, verifies it
/// with the identity provider, and injects `AuthUser` into request
/// extensions.
///
/// # Usage
///
/// Apply to routes that require authentication:
/// ```ignore
/// Router::new()
///     .route("/protected", get(handler))
///     .layer(axum::middleware::from_fn_with_state(state, require_auth))
/// ```
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    // Parse Bearer token; a malformed header counts as missing
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MissingToken)?;

    // Fresh round trip to the identity provider on every call
    let user = state.identity.get_user(token).await.map_err(|e| {
        tracing::warn!(error = %e, "Token verification failed");
        AuthError::InvalidToken
    })?;

    // Inject AuthUser into request extensions
    request.extensions_mut().insert(AuthUser::from(user));

    // Continue to handler
    Ok(next.run(request).await)
}

/// Extractor for the authenticated identity in handlers.
///
/// Use this to get the current user in protected endpoints:
///
/// ```ignore
/// async fn protected_handler(auth_user: AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", auth_user.id)
/// }
/// ```
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}
