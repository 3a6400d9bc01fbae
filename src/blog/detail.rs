use async_trait::async_trait;

use super::related::{fetch_related, RelatedArticles};
use crate::api::{ApiError, ContentClient};
use crate::config::RelatedFailurePolicy;
use crate::content::{BlogDetail, ImageResolver};
use crate::routing::ImagePattern;
use crate::view::Loader;

/// Route parameters of an article page: `/blogs/{category}/{slug}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleKey {
    pub category: String,
    pub slug: String,
}

impl ArticleKey {
    #[must_use]
    pub fn new(category: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            slug: slug.into(),
        }
    }
}

/// A fully loaded article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlePage {
    pub article: BlogDetail,
    pub related: RelatedArticles,
}

/// Loads one article, then the articles related to it.
///
/// The article is essential: its failure decides the page state. Related
/// articles are supplementary and never turn a loaded article into an error.
pub struct BlogDetailLoader {
    client: ContentClient,
    images: ImageResolver,
    related_policy: RelatedFailurePolicy,
}

impl BlogDetailLoader {
    #[must_use]
    pub fn new(client: ContentClient, related_policy: RelatedFailurePolicy) -> Self {
        let images = ImageResolver::builtin(client.base_url());
        Self {
            client,
            images,
            related_policy,
        }
    }

    /// Replace the built-in remote image patterns.
    #[must_use]
    pub fn with_image_patterns(mut self, patterns: Vec<ImagePattern>) -> Self {
        self.images = ImageResolver::new(self.client.base_url(), patterns);
        self
    }
}

#[async_trait]
impl Loader for BlogDetailLoader {
    type Key = ArticleKey;
    type Output = ArticlePage;

    fn name(&self) -> &'static str {
        "blog-detail"
    }

    fn failure_message(&self) -> &'static str {
        "Failed to load this article. Please try again later."
    }

    async fn load(&self, key: &ArticleKey) -> Result<ArticlePage, ApiError> {
        let slug = key.slug.trim();
        if slug.is_empty() {
            return Err(ApiError::NotFound {
                url: format!("/blogs/{}/", key.category),
            });
        }

        let fallback_category = Some(key.category.as_str()).filter(|c| !c.trim().is_empty());
        let item = self.client.blog_by_slug(slug, fallback_category).await?;

        let related = fetch_related(
            &self.client,
            &self.images,
            &item.category,
            &item.id,
            self.related_policy,
        )
        .await;

        Ok(ArticlePage {
            article: BlogDetail::from_item(&item, &self.images),
            related,
        })
    }
}
