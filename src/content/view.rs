use chrono::{DateTime, Utc};

use super::{
    avatar_initial, excerpt, table_of_contents, ContentItem, ContentStatus, ImageResolver, TocEntry,
};

/// Compact representation used by carousels and related-article grids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogCard {
    pub id: String,
    pub title: String,
    pub category: String,
    pub href: String,
    pub image_url: Option<String>,
    pub excerpt: String,
    pub status: ContentStatus,
}

impl BlogCard {
    #[must_use]
    pub fn from_item(item: &ContentItem, images: &ImageResolver) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            category: item.category.clone(),
            href: item.href(),
            image_url: item.image.as_ref().and_then(|i| images.resolve(i)),
            excerpt: excerpt(&item.body),
            status: item.status.clone(),
        }
    }
}

/// Everything the article page renders for the primary item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogDetail {
    pub id: String,
    pub title: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub category_href: String,
    pub image_url: Option<String>,
    pub image_caption: Option<String>,
    pub author_name: Option<String>,
    pub author_initial: char,
    pub author_avatar_url: Option<String>,
    pub author_bio: Option<String>,
    pub published_label: String,
    pub body_html: String,
    pub toc: Vec<TocEntry>,
}

impl BlogDetail {
    #[must_use]
    pub fn from_item(item: &ContentItem, images: &ImageResolver) -> Self {
        let author = item.author.as_ref();
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            category: item.category.clone(),
            subcategory: item.subcategory.clone(),
            category_href: format!("/blogs/{}", urlencoding::encode(&item.category)),
            image_url: item.image.as_ref().and_then(|i| images.resolve(i)),
            image_caption: item.image_caption.clone(),
            author_name: author.and_then(|a| a.name.clone()),
            author_initial: avatar_initial(author.and_then(|a| a.name.as_deref())),
            author_avatar_url: author
                .and_then(|a| a.avatar.as_ref())
                .and_then(|i| images.resolve(i)),
            author_bio: author.and_then(|a| a.bio.clone()),
            published_label: format_date(item.published_at),
            body_html: item.body.clone(),
            toc: table_of_contents(&item.body),
        }
    }
}

/// The blogs landing page: everything plus the editorial groupings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlogListing {
    pub cards: Vec<BlogCard>,
    pub trending: Vec<BlogCard>,
    pub recommended: Vec<BlogCard>,
    /// Distinct categories in first-seen order.
    pub categories: Vec<String>,
    pub has_more: bool,
}

impl BlogListing {
    #[must_use]
    pub fn from_items(items: &[ContentItem], has_more: bool, images: &ImageResolver) -> Self {
        let cards: Vec<BlogCard> = items
            .iter()
            .map(|item| BlogCard::from_item(item, images))
            .collect();

        let trending = cards
            .iter()
            .filter(|c| c.status == ContentStatus::Trending)
            .cloned()
            .collect();
        let recommended = cards
            .iter()
            .filter(|c| c.status == ContentStatus::Recommended)
            .cloned()
            .collect();

        let mut categories: Vec<String> = Vec::new();
        for card in &cards {
            if !categories.contains(&card.category) {
                categories.push(card.category.clone());
            }
        }

        Self {
            cards,
            trending,
            recommended,
            categories,
            has_more,
        }
    }

    /// Cards in a category; `"all"` selects everything.
    #[must_use]
    pub fn in_category(&self, category: &str) -> Vec<&BlogCard> {
        if category == "all" {
            return self.cards.iter().collect();
        }
        self.cards.iter().filter(|c| c.category == category).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Long-form publication date, e.g. `March 5, 2024`.
#[must_use]
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(
        || "Unknown Date".to_string(),
        |d| d.format("%B %-d, %Y").to_string(),
    )
}
