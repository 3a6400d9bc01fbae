//! Plain-text rendering of page states for the command line.

use std::fmt::Write;

use crate::blog::ArticlePage;
use crate::content::{BlogCard, BlogListing};
use crate::course::Curriculum;
use crate::session::AdminSession;
use crate::view::ViewState;

/// Render any page state, delegating `Ready` to `ready`.
pub fn render_state<T>(
    state: &ViewState<T>,
    loading: &str,
    not_found: &str,
    ready: impl FnOnce(&T) -> String,
) -> String {
    match state {
        ViewState::Loading => format!("{loading}\n"),
        ViewState::Error { message, retryable } => {
            if *retryable {
                format!("{message}\n[Retry]\n")
            } else {
                format!("{message}\n")
            }
        }
        ViewState::NotFound => format!("{not_found}\n"),
        ViewState::Ready(value) => ready(value),
    }
}

pub fn render_listing(state: &ViewState<BlogListing>, category: Option<&str>) -> String {
    render_state(state, "Loading blogs...", "No blogs found.", |listing| {
        let mut out = String::new();

        if !listing.categories.is_empty() {
            let _ = writeln!(out, "Categories: All, {}\n", listing.categories.join(", "));
        }

        match category {
            Some(category) => {
                let cards = listing.in_category(category);
                let _ = writeln!(out, "{category} ({})", cards.len());
                for card in cards {
                    push_card(&mut out, card);
                }
            }
            None => {
                push_section(&mut out, "Recommended Blogs", &listing.recommended);
                push_section(&mut out, "Trending Blogs", &listing.trending);
                if listing.recommended.is_empty() && listing.trending.is_empty() {
                    push_section(&mut out, "All Blogs", &listing.cards);
                }
            }
        }

        if listing.is_empty() {
            out.push_str("No blogs found.\n");
        }
        if listing.has_more {
            out.push_str("More articles available.\n");
        }
        out
    })
}

pub fn render_article(state: &ViewState<ArticlePage>) -> String {
    render_state(
        state,
        "Loading article...",
        "Blog Not Found\nThe article you're looking for doesn't exist or has been removed.",
        |page| {
            let article = &page.article;
            let mut out = String::new();

            let _ = writeln!(out, "{}", article.title);
            let _ = writeln!(out, "{} | {}", article.category, article.published_label);
            if let Some(name) = &article.author_name {
                let _ = writeln!(out, "[{}] {name}", article.author_initial);
            }
            if let Some(url) = &article.image_url {
                let _ = writeln!(out, "Image: {url}");
            }

            if !article.toc.is_empty() {
                out.push_str("\nTable of Contents\n");
                for entry in &article.toc {
                    let indent = if entry.level > 2 { "    " } else { "  " };
                    let _ = writeln!(out, "{indent}- {} (#{})", entry.text, entry.id);
                }
            }

            let _ = writeln!(out, "\n{}", crate::content::strip_tags(&article.body_html).trim());

            if !page.related.cards.is_empty() {
                out.push_str("\nRelated Articles\n");
                for card in &page.related.cards {
                    push_card(&mut out, card);
                }
            }
            if let Some(notice) = &page.related.notice {
                let _ = writeln!(out, "\n{notice}");
            }
            out
        },
    )
}

pub fn render_curriculum(curriculum: &Curriculum) -> String {
    let mut out = String::new();
    for stat in &curriculum.stats {
        let _ = writeln!(out, "{} {}", stat.value, stat.label);
    }
    if !curriculum.stats.is_empty() {
        out.push('\n');
    }
    for (index, module) in curriculum.modules.iter().enumerate() {
        let _ = writeln!(out, "{}. {} ({})", index + 1, module.title, module.duration);
        for topic in &module.topics {
            let _ = writeln!(out, "   - {topic}");
        }
    }
    out
}

pub fn render_session(session: Option<&AdminSession>) -> String {
    match session {
        Some(s) => format!("Logged in as {} ({}), id {}\n", s.username, s.role, s.id),
        None => "Not logged in.\n".to_string(),
    }
}

fn push_section(out: &mut String, title: &str, cards: &[BlogCard]) {
    if cards.is_empty() {
        return;
    }
    let _ = writeln!(out, "{title}");
    for card in cards {
        push_card(out, card);
    }
    out.push('\n');
}

fn push_card(out: &mut String, card: &BlogCard) {
    let _ = writeln!(out, "  * {} [{}]  {}", card.title, card.category, card.href);
    if !card.excerpt.is_empty() {
        let _ = writeln!(out, "    {}", card.excerpt);
    }
}
