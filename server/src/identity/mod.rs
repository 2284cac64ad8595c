//! Identity Provider Client
//!
//! Thin typed client for the Supabase `GoTrue` REST API. The server uses it
//! for password sign-in, account creation, and bearer-token verification;
//! sessions come back from the provider and are passed through to callers
//! opaquely.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Error from an identity-provider operation.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Transport failure (connect error, timeout).
    #[error("Identity provider unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider rejected the request.
    #[error("Identity provider rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Account already exists for this email.
    ///
    /// Distinct from `Rejected` so callers can tolerate the
    /// create-after-concurrent-create race as non-fatal.
    #[error("Account already registered")]
    AlreadyRegistered,

    /// Provider returned a body we could not decode.
    #[error("Invalid identity provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for identity-provider operations.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// User record owned by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityUser {
    /// Provider-side account ID.
    pub id: String,
    /// Account email (the derived `{zalo_id}@zalo.user` for bridged users).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Provider role (e.g., "authenticated").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Account creation timestamp as reported by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Session issued by the identity provider.
///
/// Not persisted by this system; returned to the caller verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<IdentityUser>,
}

/// Client for the identity provider's auth endpoints.
///
/// Stateless over a shared `reqwest::Client`; safe for concurrent reuse
/// across requests.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    service_role_key: String,
}

impl IdentityClient {
    /// Create a new client against the given provider base URL.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        anon_key: &str,
        service_role_key: &str,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            service_role_key: service_role_key.to_string(),
        }
    }

    /// Sign in with email and password, returning the provider session.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> IdentityResult<Session> {
        let resp = self
            .http
            .post(format!("{}/auth/v1/token", self.base_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(rejection(status.as_u16(), resp).await);
        }

        Ok(resp.json::<Session>().await?)
    }

    /// Register a new account through the public signup endpoint.
    ///
    /// Depending on the provider's confirmation settings the response is
    /// either the bare user object or a session wrapping one.
    pub async fn sign_up(&self, email: &str, password: &str) -> IdentityResult<IdentityUser> {
        let resp = self
            .http
            .post(format!("{}/auth/v1/signup", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(rejection(status.as_u16(), resp).await);
        }

        let body: Value = resp.json().await?;
        let user = body.get("user").cloned().unwrap_or(body);
        Ok(serde_json::from_value(user)?)
    }

    /// Create an account with the service-role key, marking the email
    /// pre-confirmed so password sign-in works immediately.
    ///
    /// Returns `AlreadyRegistered` when the provider reports an existing
    /// account for this email.
    pub async fn admin_create_user(&self, email: &str, password: &str) -> IdentityResult<()> {
        let resp = self
            .http
            .post(format!("{}/auth/v1/admin/users", self.base_url))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .json(&json!({
                "email": email,
                "password": password,
                "email_confirm": true,
            }))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let err = rejection(status.as_u16(), resp).await;
        if let IdentityError::Rejected { status, ref message } = err {
            if is_already_registered(status, message) {
                return Err(IdentityError::AlreadyRegistered);
            }
        }
        Err(err)
    }

    /// Resolve the account a bearer token belongs to.
    ///
    /// A rejected or expired token surfaces as `Rejected`.
    pub async fn get_user(&self, access_token: &str) -> IdentityResult<IdentityUser> {
        let resp = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(rejection(status.as_u16(), resp).await);
        }

        Ok(resp.json::<IdentityUser>().await?)
    }

    /// Sign in, creating the account first if needed.
    ///
    /// Sign-in failure for a brand-new account is the expected path: the
    /// account is created pre-confirmed with the service-role key and
    /// sign-in is retried exactly once. A concurrent creation racing this
    /// one surfaces as `AlreadyRegistered` and is absorbed.
    pub async fn sign_in_or_create(&self, email: &str, password: &str) -> IdentityResult<Session> {
        match self.sign_in_with_password(email, password).await {
            Ok(session) => Ok(session),
            Err(first) => {
                tracing::debug!(error = %first, "Password sign-in failed, creating account");
                match self.admin_create_user(email, password).await {
                    Ok(()) | Err(IdentityError::AlreadyRegistered) => {}
                    Err(e) => return Err(e),
                }
                self.sign_in_with_password(email, password).await
            }
        }
    }
}

/// Build a `Rejected` error from a non-success response body.
async fn rejection(status: u16, resp: reqwest::Response) -> IdentityError {
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    let message = body
        .get("msg")
        .or_else(|| body.get("message"))
        .or_else(|| body.get("error_description"))
        .and_then(Value::as_str)
        .unwrap_or("request rejected")
        .to_string();
    IdentityError::Rejected { status, message }
}

/// Whether a rejection means the account already exists.
///
/// `GoTrue` reports this as 422 (`email_exists` / "User already registered")
/// or 409 depending on version.
fn is_already_registered(status: u16, message: &str) -> bool {
    let msg = message.to_ascii_lowercase();
    matches!(status, 409 | 422) && (msg.contains("already") || msg.contains("email_exists"))
}
