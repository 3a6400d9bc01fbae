use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, warn};
use url::Url;

use super::navigator::Navigator;
use super::store::SessionStore;
use crate::api::{self, ApiError, BaseUrl};
use crate::config::Config;
use crate::constants::LOGIN_ROUTE;

/// Issues requests on behalf of the logged-in admin.
///
/// No stored token means no request: the user is sent to the login page and
/// the call fails with [`ApiError::NotAuthenticated`]. A 401 from the backend
/// ends the session the same way.
#[derive(Clone)]
pub struct AuthorizedClient {
    http: reqwest::Client,
    base: BaseUrl,
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl AuthorizedClient {
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base_url: Option<String>,
        store: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            http,
            base: BaseUrl::new("SITE_API_URL", base_url),
            store,
            navigator,
        }
    }

    #[must_use]
    pub fn from_config(
        http: reqwest::Client,
        config: &Config,
        store: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::new(http, config.api_url.clone(), store, navigator)
    }

    /// Send `method path` with the bearer token and an optional JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotAuthenticated`] without sending when no session
    /// is stored, [`ApiError::Unauthorized`] after a 401 (the session is
    /// cleared), or any other request error.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.base.endpoint(path)?;

        let Some(session) = self.store.read() else {
            warn!(url = %url, "No admin session; sending to login");
            self.navigator.navigate(LOGIN_ROUTE);
            return Err(ApiError::NotAuthenticated);
        };

        let mut request = self
            .http
            .request(method, url.clone())
            .bearer_auth(&session.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        match api::send(request, &url).await {
            Err(ApiError::Unauthorized { url }) => {
                warn!(url = %url, username = %session.username, "Admin session rejected by backend");
                if let Err(e) = self.store.clear().await {
                    error!(error = %e, "Failed to clear admin session");
                }
                self.navigator.navigate(LOGIN_ROUTE);
                Err(ApiError::Unauthorized { url })
            }
            other => other,
        }
    }

    /// Authorized `GET path`, decoded as JSON.
    ///
    /// # Errors
    ///
    /// As [`AuthorizedClient::send`], plus decode failures.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.send(Method::GET, path, None).await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
            url: self.url_for_log(path),
            source: e.into(),
        })
    }

    fn url_for_log(&self, path: &str) -> String {
        self.base
            .endpoint(path)
            .map_or_else(|_| path.to_string(), |u: Url| u.to_string())
    }
}
