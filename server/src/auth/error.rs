//! Authentication Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Authentication error types.
///
/// Display strings carry internal detail for server-side logs; the HTTP
/// response body only ever exposes the generic message chosen in
/// `IntoResponse`.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or malformed Authorization header (Gate).
    #[error("Missing authorization token")]
    MissingToken,

    /// Identity provider rejected the bearer token (Gate).
    #[error("Invalid token")]
    InvalidToken,

    /// Zalo rejected the access token or was unreachable.
    #[error("Zalo exchange failed ({status}): {message}")]
    UpstreamIdentity { status: u16, message: String },

    /// Identity provider rejected both sign-in and create-then-retry.
    #[error("Session issuance failed: {0}")]
    SessionIssuance(String),

    /// Database error.
    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

/// Error response body for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Generic client-facing error message.
    pub error: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authorization token"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            // Known upstream rejection vs. unexpected failure; both cross the
            // trust boundary as the same generic signal
            Self::UpstreamIdentity { .. } => (StatusCode::BAD_REQUEST, "Authentication failed"),
            Self::SessionIssuance(_) | Self::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed")
            }
        };

        if status.is_server_error() {
            error!(error = ?self, "Authentication failed");
        } else {
            warn!(error = ?self, "Authentication rejected");
        }

        let body = Json(ErrorResponse {
            error: message.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_errors_map_to_unauthorized() {
        let resp = AuthError::MissingToken.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = AuthError::InvalidToken.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_upstream_rejection_is_bad_request() {
        let resp = AuthError::UpstreamIdentity {
            status: 400,
            message: "invalid access token".into(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_session_issuance_is_internal_error() {
        let resp = AuthError::SessionIssuance("provider down".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
