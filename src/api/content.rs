use serde_json::Value;
use tracing::debug;

use super::schema::{decode_detail, decode_listing, BlogPage};
use super::{send, ApiError, BaseUrl};
use crate::config::Config;
use crate::content::ContentItem;

/// Read-only client for the blog backend.
#[derive(Clone)]
pub struct ContentClient {
    http: reqwest::Client,
    base: BaseUrl,
}

impl ContentClient {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: Option<String>) -> Self {
        Self {
            http,
            base: BaseUrl::new("SITE_BLOG_API_URL", base_url),
        }
    }

    #[must_use]
    pub fn from_config(http: reqwest::Client, config: &Config) -> Self {
        Self::new(http, config.blog_api_url.clone())
    }

    /// Base URL relative image paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base.as_deref()
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.base.is_configured()
    }

    /// `GET /api/blogs`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unconfigured, unreachable, or sends
    /// a malformed listing.
    pub async fn list_blogs(&self) -> Result<BlogPage, ApiError> {
        let url = self.base.endpoint("/api/blogs")?;
        self.fetch_listing(url).await
    }

    /// `GET /api/blogs?category={category}`
    ///
    /// # Errors
    ///
    /// Same as [`ContentClient::list_blogs`].
    pub async fn blogs_by_category(&self, category: &str) -> Result<BlogPage, ApiError> {
        let mut url = self.base.endpoint("/api/blogs")?;
        url.query_pairs_mut().append_pair("category", category);
        self.fetch_listing(url).await
    }

    /// `GET /api/blogs/slug/{slug}`
    ///
    /// `fallback_category` fills in the category for records that lack one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] on 404 or an empty body, otherwise the
    /// same errors as [`ContentClient::list_blogs`].
    pub async fn blog_by_slug(
        &self,
        slug: &str,
        fallback_category: Option<&str>,
    ) -> Result<ContentItem, ApiError> {
        let path = format!("/api/blogs/slug/{}", urlencoding::encode(slug));
        let url = self.base.endpoint(&path)?;
        let body = send(self.http.get(url.clone()), &url).await?;
        let item = decode_detail(&body, fallback_category).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })?;
        item.ok_or_else(|| ApiError::NotFound {
            url: url.to_string(),
        })
    }

    /// `GET /api/blogs/ping`. The body is returned as-is for logging.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unconfigured or the ping fails.
    pub async fn ping(&self) -> Result<Value, ApiError> {
        let url = self.base.endpoint("/api/blogs/ping")?;
        let body = send(self.http.get(url.clone()), &url).await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            source: e.into(),
        })
    }

    async fn fetch_listing(&self, url: url::Url) -> Result<BlogPage, ApiError> {
        let body = send(self.http.get(url.clone()), &url).await?;
        let page = decode_listing(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })?;
        debug!(url = %url, count = page.items.len(), has_more = page.has_more, "Fetched blog listing");
        Ok(page)
    }
}
