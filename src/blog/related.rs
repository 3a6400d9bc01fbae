use tracing::{debug, warn};

use crate::api::ContentClient;
use crate::config::RelatedFailurePolicy;
use crate::constants::RELATED_LIMIT;
use crate::content::{BlogCard, ContentItem, ImageResolver};

/// Note shown under an article when related posts could not be loaded and
/// the policy asks for it.
pub const RELATED_NOTICE: &str = "Couldn't load related articles.";

/// Supplementary articles shown under the primary one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RelatedArticles {
    pub cards: Vec<BlogCard>,
    pub notice: Option<String>,
}

/// Drop the current article and keep at most [`RELATED_LIMIT`] items, in
/// backend order.
#[must_use]
pub fn select_related<'a>(items: &'a [ContentItem], current_id: &str) -> Vec<&'a ContentItem> {
    items
        .iter()
        .filter(|item| item.id != current_id)
        .take(RELATED_LIMIT)
        .collect()
}

/// Fetch articles sharing `category`. Never fails: a failed fetch yields an
/// empty list, plus a notice under [`RelatedFailurePolicy::Notice`].
pub async fn fetch_related(
    client: &ContentClient,
    images: &ImageResolver,
    category: &str,
    current_id: &str,
    policy: RelatedFailurePolicy,
) -> RelatedArticles {
    match client.blogs_by_category(category).await {
        Ok(page) => {
            let cards: Vec<BlogCard> = select_related(&page.items, current_id)
                .into_iter()
                .map(|item| BlogCard::from_item(item, images))
                .collect();
            debug!(category = %category, count = cards.len(), "Loaded related articles");
            RelatedArticles {
                cards,
                notice: None,
            }
        }
        Err(e) => {
            warn!(category = %category, error = %e, "Failed to load related articles");
            RelatedArticles {
                cards: Vec::new(),
                notice: match policy {
                    RelatedFailurePolicy::Silent => None,
                    RelatedFailurePolicy::Notice => Some(RELATED_NOTICE.to_string()),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentStatus;

    fn items(n: usize) -> Vec<ContentItem> {
        (0..n)
            .map(|i| ContentItem {
                id: format!("id-{i}"),
                slug: Some(format!("post-{i}")),
                title: format!("Post {i}"),
                category: "SAP".to_string(),
                subcategory: None,
                body: String::new(),
                image: None,
                image_caption: None,
                author: None,
                status: ContentStatus::None,
                published_at: None,
                updated_at: None,
            })
            .collect()
    }

    #[test]
    fn test_related_excludes_current_and_caps() {
        for size in 0..8 {
            let all = items(size);
            for current in 0..=size {
                let current_id = format!("id-{current}");
                let related = select_related(&all, &current_id);
                assert!(related.len() <= RELATED_LIMIT);
                assert!(related.iter().all(|item| item.id != current_id));
                assert_eq!(
                    related.len(),
                    all.iter().filter(|i| i.id != current_id).count().min(RELATED_LIMIT)
                );
            }
        }
    }

    #[test]
    fn test_related_keeps_backend_order() {
        let all = items(6);
        let ids: Vec<&str> = select_related(&all, "id-1")
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["id-0", "id-2", "id-3"]);
    }
}
