use async_trait::async_trait;

use crate::api::{ApiError, ContentClient};
use crate::content::{BlogListing, ImageResolver};
use crate::routing::ImagePattern;
use crate::view::Loader;

/// Which slice of the listing to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListingKey {
    #[default]
    All,
    Category(String),
}

/// Loads the blogs landing page.
pub struct BlogListingLoader {
    client: ContentClient,
    images: ImageResolver,
}

impl BlogListingLoader {
    #[must_use]
    pub fn new(client: ContentClient) -> Self {
        let images = ImageResolver::builtin(client.base_url());
        Self { client, images }
    }

    /// Replace the built-in remote image patterns.
    #[must_use]
    pub fn with_image_patterns(mut self, patterns: Vec<ImagePattern>) -> Self {
        self.images = ImageResolver::new(self.client.base_url(), patterns);
        self
    }
}

#[async_trait]
impl Loader for BlogListingLoader {
    type Key = ListingKey;
    type Output = BlogListing;

    fn name(&self) -> &'static str {
        "blog-listing"
    }

    fn failure_message(&self) -> &'static str {
        "Failed to load blogs. Please try again later."
    }

    async fn load(&self, key: &ListingKey) -> Result<BlogListing, ApiError> {
        let page = match key {
            ListingKey::All => self.client.list_blogs().await?,
            ListingKey::Category(category) => self.client.blogs_by_category(category).await?,
        };
        Ok(BlogListing::from_items(&page.items, page.has_more, &self.images))
    }
}
