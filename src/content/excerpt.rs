use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::EXCERPT_CHARS;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"));

/// Remove HTML tags, leaving text (entities are left untouched).
#[must_use]
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, "").into_owned()
}

/// Plain-text preview of an HTML body, capped at [`EXCERPT_CHARS`] characters
/// and always followed by an ellipsis.
#[must_use]
pub fn excerpt(html: &str) -> String {
    let text = strip_tags(html);
    let mut out: String = text.chars().take(EXCERPT_CHARS).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(
            strip_tags("<p>Hello <strong>world</strong></p>"),
            "Hello world"
        );
        assert_eq!(strip_tags("no markup"), "no markup");
        assert_eq!(strip_tags(""), "");
    }

    #[test]
    fn test_excerpt_caps_length() {
        let body = format!("<p>{}</p>", "x".repeat(200));
        let out = excerpt(&body);
        assert_eq!(out.chars().count(), EXCERPT_CHARS + 3);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_excerpt_multibyte_safe() {
        let body = "é".repeat(100);
        let out = excerpt(&body);
        assert_eq!(out.chars().filter(|c| *c == 'é').count(), EXCERPT_CHARS);
    }

    #[test]
    fn test_excerpt_short_body() {
        assert_eq!(excerpt("<h2>Hi</h2>"), "Hi...");
    }
}
