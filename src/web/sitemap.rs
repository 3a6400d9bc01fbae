use crate::constants::{LOGIN_ROUTE, PRIVILEGED_DASHBOARD_ROUTE, STANDARD_DASHBOARD_ROUTE};
use crate::content::ContentItem;

/// Pages that exist regardless of backend content.
pub const STATIC_PAGES: &[&str] = &["/", "/blogs"];

/// Generate sitemap XML for the static pages plus every article.
pub fn generate_sitemap(items: &[ContentItem], site_url: &str) -> String {
    let static_urls = STATIC_PAGES.iter().map(|path| {
        format!(
            "  <url>\n    <loc>{}</loc>\n  </url>",
            xml_escape(&format!("{site_url}{path}"))
        )
    });

    let article_urls = items.iter().map(|item| {
        let loc = xml_escape(&format!("{site_url}{}", item.href()));
        match item.updated_at.or(item.published_at) {
            Some(ts) => format!(
                "  <url>\n    <loc>{loc}</loc>\n    <lastmod>{}</lastmod>\n  </url>",
                ts.format("%Y-%m-%d")
            ),
            None => format!("  <url>\n    <loc>{loc}</loc>\n  </url>"),
        }
    });

    let urls = static_urls
        .chain(article_urls)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{urls}
</urlset>
"#
    )
}

/// robots.txt keeping crawlers out of the admin area.
pub fn generate_robots(site_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: {LOGIN_ROUTE}\nDisallow: {STANDARD_DASHBOARD_ROUTE}\nDisallow: {}\n\nSitemap: {site_url}/sitemap.xml\n",
        PRIVILEGED_DASHBOARD_ROUTE
            .rsplit_once('/')
            .map_or(PRIVILEGED_DASHBOARD_ROUTE, |(dir, _)| dir)
    )
}

/// Escape special XML characters
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
