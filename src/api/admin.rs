use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::schema::DecodeError;
use super::{send, ApiError, BaseUrl};
use crate::config::Config;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Successful `POST /api/admin-login` body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
    pub username: String,
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct LoginFailure {
    message: Option<String>,
}

/// What the backend said about a credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Accepted(LoginResponse),
    /// Credentials refused; carries the message to show.
    Rejected(String),
}

/// Client for the main backend (admin login and health).
#[derive(Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    base: BaseUrl,
}

impl AdminClient {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: Option<String>) -> Self {
        Self {
            http,
            base: BaseUrl::new("SITE_API_URL", base_url),
        }
    }

    #[must_use]
    pub fn from_config(http: reqwest::Client, config: &Config) -> Self {
        Self::new(http, config.api_url.clone())
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.base.is_configured()
    }

    /// `POST /api/admin-login`
    ///
    /// A non-2xx answer with a JSON body is a [`LoginOutcome::Rejected`], not
    /// an error. Anything else the backend sends back is a decode error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unconfigured, unreachable, or sends
    /// a body that cannot be understood.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        let url = self.base.endpoint("/api/admin-login")?;
        debug!(url = %url, username = %username, "Submitting admin login");

        let response = self
            .http
            .post(url.clone())
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        if status.is_success() {
            let accepted: LoginResponse =
                serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
                    url: url.to_string(),
                    source: DecodeError::from(e),
                })?;
            return Ok(LoginOutcome::Accepted(accepted));
        }

        // Proxies in front of a sleeping backend answer with HTML.
        let failure: LoginFailure = serde_json::from_slice(&body).map_err(|e| {
            warn!(status = %status, "Admin login failed with a non-JSON body");
            ApiError::Decode {
                url: url.to_string(),
                source: DecodeError::from(e),
            }
        })?;
        let message = failure
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "Admin login failed".to_string());
        warn!(status = %status, username = %username, "Admin login rejected");
        Ok(LoginOutcome::Rejected(message))
    }

    /// `GET /api/ping`. The body is returned as-is for logging.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unconfigured or the ping fails.
    pub async fn ping(&self) -> Result<Value, ApiError> {
        let url = self.base.endpoint("/api/ping")?;
        let body = send(self.http.get(url.clone()), &url).await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            source: e.into(),
        })
    }
}

/// Backends disagree on whether ids are strings or numbers.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}
