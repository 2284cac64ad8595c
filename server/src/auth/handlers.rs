//! Authentication HTTP Handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{AuthError, AuthResult};
use crate::api::AppState;
use crate::db::{find_or_create_zalo_user, User};
use crate::identity::Session;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Zalo login request.
#[derive(Debug, Deserialize)]
pub struct ZaloLoginRequest {
    /// Short-lived Zalo client access token.
    pub access_token: String,
}

/// User payload in the login response.
///
/// `email` is always null: the system has no real email for Zalo-originated
/// users, only the derived reconciliation address.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub zalo_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            zalo_id: user.zalo_id,
            name: user.name,
            email: None,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Zalo login response.
#[derive(Debug, Serialize)]
pub struct ZaloLoginResponse {
    /// Local user record (created on first login).
    pub user: UserResponse,
    /// Provider-issued session, passed through verbatim.
    pub session: Session,
}

// ============================================================================
// Handlers
// ============================================================================

/// Log in with a Zalo access token.
///
/// Proves the token to Zalo with an `appsecret_proof`, finds or creates the
/// local user row for the returned profile, then obtains a provider session
/// for the account derived from the Zalo ID (creating it pre-confirmed on
/// first login). Each step is a hard dependency on the previous one; there
/// are no partial-commit semantics, so a user row created before a failed
/// session issuance is kept.
///
/// POST /auth/zalo
#[tracing::instrument(skip(state, body))]
pub async fn zalo_login(
    State(state): State<AppState>,
    Json(body): Json<ZaloLoginRequest>,
) -> AuthResult<Json<ZaloLoginResponse>> {
    // Identity exchange: proof + profile fetch
    let profile = state.zalo.fetch_profile(&body.access_token).await?;

    tracing::debug!(zalo_id = %profile.id, "Zalo profile resolved");

    // Find-or-create keyed on the unique zalo_id; returning users are never
    // refreshed from the fresh profile
    let user = find_or_create_zalo_user(&state.db, &profile.id, profile.name.as_deref()).await?;

    // Session reconciliation via the derived credentials. The zalo_id doubles
    // as the provider password; the derived email is the only link between
    // the local row and the provider account.
    let email = format!("{}@zalo.user", profile.id);
    let session = state
        .identity
        .sign_in_or_create(&email, &profile.id)
        .await
        .map_err(|e| AuthError::SessionIssuance(e.to_string()))?;

    tracing::info!(user_id = %user.id, zalo_id = %profile.id, "Zalo login succeeded");

    Ok(Json(ZaloLoginResponse {
        user: user.into(),
        session,
    }))
}

/// CORS preflight for the login endpoint.
///
/// OPTIONS /auth/zalo
pub async fn zalo_preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
