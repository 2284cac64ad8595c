//! Zalo Graph API Client
//!
//! Fetches the caller's Zalo profile, proving possession of the app secret
//! via an HMAC-SHA256 `appsecret_proof` over the access token.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;

use super::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Fields requested from the Zalo profile endpoint.
const PROFILE_FIELDS: &str = "id,name,birthday,picture";

/// Error from a Zalo profile fetch.
#[derive(Debug, Error)]
pub enum ZaloError {
    /// Transport failure (connect error, timeout).
    #[error("Zalo API unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// Zalo rejected the token (non-success status or error body).
    #[error("Zalo API rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Zalo returned a body we could not decode.
    #[error("Invalid Zalo API response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<ZaloError> for AuthError {
    fn from(err: ZaloError) -> Self {
        match err {
            ZaloError::Rejected { status, message } => Self::UpstreamIdentity { status, message },
            // Unreachable/timeout and undecodable responses are upstream
            // failures too; the status is synthetic
            other => Self::UpstreamIdentity {
                status: 0,
                message: other.to_string(),
            },
        }
    }
}

/// Zalo user profile as returned by `GET /v2.0/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct ZaloProfile {
    /// Stable Zalo account ID (string-encoded).
    pub id: String,
    /// Display name.
    pub name: Option<String>,
    /// Birthday (dd/mm/yyyy, present only when granted).
    pub birthday: Option<String>,
    /// Avatar payload.
    pub picture: Option<Value>,
}

/// Compute the hex-encoded HMAC-SHA256 proof over an access token.
///
/// Zalo requires this proof alongside the token itself: it shows the caller
/// holds the app secret and is relaying a genuine Zalo-issued token.
pub fn appsecret_proof(access_token: &str, app_secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(access_token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Client for the Zalo Graph API.
#[derive(Debug, Clone)]
pub struct ZaloClient {
    http: reqwest::Client,
    base_url: String,
    app_secret: String,
}

impl ZaloClient {
    /// Create a new client against the given Graph API base URL.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: &str, app_secret: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_secret: app_secret.to_string(),
        }
    }

    /// Fetch the profile behind an access token.
    ///
    /// Fails on non-success HTTP status or a body carrying a non-zero
    /// `error` field. Never retried; the token is short-lived and a
    /// rejection is final for this request.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<ZaloProfile, ZaloError> {
        let resp = self
            .http
            .get(format!("{}/v2.0/me", self.base_url))
            .query(&[("fields", PROFILE_FIELDS)])
            .header("access_token", access_token)
            .header("appsecret_proof", appsecret_proof(access_token, &self.app_secret))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ZaloError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = resp.json().await?;

        // Zalo reports failure in-band: any "error" field other than 0
        // (including string codes) means the exchange failed
        if let Some(err) = body.get("error") {
            if err.as_i64() != Some(0) {
                let message = body
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown Zalo error")
                    .to_string();
                return Err(ZaloError::Rejected {
                    status: status.as_u16(),
                    message,
                });
            }
        }

        Ok(serde_json::from_value(body)?)
    }
}
