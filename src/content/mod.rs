//! Typed content records and the view models built from them.
//!
//! Records arrive from the blog backend through [`crate::api::schema`], which
//! guarantees every [`ContentItem`] here is fully validated. The submodules
//! turn items into what pages actually show.

pub mod excerpt;
pub mod image;
pub mod toc;
pub mod view;

use chrono::{DateTime, Utc};
use url::Url;

pub use excerpt::{excerpt, strip_tags};
pub use image::ImageResolver;
pub use toc::{table_of_contents, TocEntry};
pub use view::{BlogCard, BlogDetail, BlogListing};

/// A blog post or course unit owned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    pub id: String,
    pub slug: Option<String>,
    pub title: String,
    pub category: String,
    pub subcategory: Option<String>,
    /// Rich text body (HTML).
    pub body: String,
    pub image: Option<ImageRef>,
    pub image_caption: Option<String>,
    pub author: Option<Author>,
    pub status: ContentStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ContentItem {
    /// Path segment used to link to this item. Falls back to the identifier
    /// for records without a slug.
    #[must_use]
    pub fn route_slug(&self) -> &str {
        self.slug.as_deref().unwrap_or(&self.id)
    }

    /// Site path of the detail page.
    #[must_use]
    pub fn href(&self) -> String {
        format!(
            "/blogs/{}/{}",
            urlencoding::encode(&self.category),
            urlencoding::encode(self.route_slug())
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Author {
    pub name: Option<String>,
    pub avatar: Option<ImageRef>,
    pub bio: Option<String>,
}

impl Author {
    /// Letter shown in place of a missing avatar.
    #[must_use]
    pub fn initial(&self) -> char {
        avatar_initial(self.name.as_deref())
    }
}

/// Initial for a default avatar: first letter of the name, upper-cased, or `A`.
#[must_use]
pub fn avatar_initial(name: Option<&str>) -> char {
    name.and_then(|n| n.trim().chars().next())
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or('A')
}

/// Editorial tag the listing page groups posts by.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContentStatus {
    Trending,
    Recommended,
    Other(String),
    #[default]
    None,
}

impl ContentStatus {
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::None,
            Some("Trending") => Self::Trending,
            Some("Recommended") => Self::Recommended,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Trending => "Trending",
            Self::Recommended => "Recommended",
            Self::Other(s) => s,
            Self::None => "",
        }
    }
}

/// Where an image lives.
///
/// Absolute URLs are used as-is; relative paths are appended to the blog
/// backend's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Absolute(Url),
    Relative(String),
}

impl ImageRef {
    /// Resolve to a fetchable URL. Relative paths need a base URL.
    #[must_use]
    pub fn resolve(&self, base_url: Option<&str>) -> Option<String> {
        match self {
            Self::Absolute(url) => Some(url.to_string()),
            Self::Relative(path) => {
                let base = base_url?.trim_end_matches('/');
                if path.starts_with('/') {
                    Some(format!("{base}{path}"))
                } else {
                    Some(format!("{base}/{path}"))
                }
            }
        }
    }
}
