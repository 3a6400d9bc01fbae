//! Blog pages: the listing and the article view.
//!
//! Both are [`Loader`](crate::view::Loader)s so they plug into a
//! [`FetchController`](crate::view::FetchController).

pub mod detail;
pub mod listing;
pub mod related;

pub use detail::{ArticleKey, ArticlePage, BlogDetailLoader};
pub use listing::{BlogListingLoader, ListingKey};
pub use related::{select_related, RelatedArticles};
