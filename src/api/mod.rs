//! Clients for the site's REST backends.
//!
//! Two backends exist: the main API (admin login, health) and the blog API
//! (content). Both are optional in configuration; a client without a base URL
//! fails every call with [`ApiError::NotConfigured`] before touching the
//! network.

pub mod admin;
pub mod content;
pub mod error;
pub mod schema;

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::constants::USER_AGENT;

pub use admin::{AdminClient, LoginOutcome, LoginResponse};
pub use content::ContentClient;
pub use error::ApiError;
pub use schema::{BlogPage, DecodeError};

/// Build the shared HTTP client.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// A backend root address plus the configuration key it came from.
#[derive(Debug, Clone)]
pub struct BaseUrl {
    name: &'static str,
    value: Option<String>,
}

impl BaseUrl {
    #[must_use]
    pub fn new(name: &'static str, value: Option<String>) -> Self {
        Self {
            name,
            value: value
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty()),
        }
    }

    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        self.value.as_deref()
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.value.is_some()
    }

    /// Append an absolute path (`/api/...`) to the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotConfigured`] when no base URL is set.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let base = self
            .value
            .as_deref()
            .ok_or(ApiError::NotConfigured { name: self.name })?;
        let raw = format!("{base}{path}");
        Url::parse(&raw).map_err(|source| ApiError::InvalidEndpoint { url: raw, source })
    }
}

/// Send a request and read its body, classifying status codes.
///
/// 404 maps to [`ApiError::NotFound`], 401 to [`ApiError::Unauthorized`],
/// any other non-2xx to [`ApiError::Status`].
pub(crate) async fn send(request: reqwest::RequestBuilder, url: &Url) -> Result<Vec<u8>, ApiError> {
    debug!(url = %url, "Backend request");
    let response = request.send().await.map_err(|source| ApiError::Transport {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    match status {
        StatusCode::NOT_FOUND => {
            return Err(ApiError::NotFound {
                url: url.to_string(),
            })
        }
        StatusCode::UNAUTHORIZED => {
            return Err(ApiError::Unauthorized {
                url: url.to_string(),
            })
        }
        s if !s.is_success() => {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: s,
            })
        }
        _ => {}
    }

    let body = response.bytes().await.map_err(|source| ApiError::Transport {
        url: url.to_string(),
        source,
    })?;
    Ok(body.to_vec())
}
