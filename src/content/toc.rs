use scraper::{Html, Selector};

/// One heading in an article's table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Anchor id. Taken from the heading when present, otherwise `heading-{index}`.
    pub id: String,
    pub text: String,
    /// 2 or 3.
    pub level: u8,
}

/// Collect `h2`/`h3` headings from an article body in document order.
#[must_use]
pub fn table_of_contents(html: &str) -> Vec<TocEntry> {
    let document = Html::parse_fragment(html);
    let selector = Selector::parse("h2, h3").expect("Invalid selector");

    document
        .select(&selector)
        .enumerate()
        .map(|(index, heading)| {
            let id = heading
                .value()
                .attr("id")
                .filter(|id| !id.is_empty())
                .map_or_else(|| format!("heading-{index}"), ToString::to_string);
            let text = heading
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            let level = if heading.value().name() == "h2" { 2 } else { 3 };
            TocEntry { id, text, level }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toc_orders_and_numbers_headings() {
        let html = r#"
            <h2>Why SAP</h2>
            <p>intro</p>
            <h3 id="modules">Core   modules</h3>
            <h4>ignored</h4>
            <h2>Careers</h2>
        "#;
        let toc = table_of_contents(html);
        assert_eq!(
            toc,
            vec![
                TocEntry {
                    id: "heading-0".to_string(),
                    text: "Why SAP".to_string(),
                    level: 2
                },
                TocEntry {
                    id: "modules".to_string(),
                    text: "Core modules".to_string(),
                    level: 3
                },
                TocEntry {
                    id: "heading-2".to_string(),
                    text: "Careers".to_string(),
                    level: 2
                },
            ]
        );
    }

    #[test]
    fn test_toc_empty_body() {
        assert!(table_of_contents("").is_empty());
        assert!(table_of_contents("<p>no headings</p>").is_empty());
    }
}
