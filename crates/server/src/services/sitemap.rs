//! Sitemap rendering.
//!
//! Rendering is pure; persisting the result under [`SITEMAP_KEY`] is the
//! caller's job.

use std::fmt::Write as _;

use techmorpho_core::Service;

/// Setting key holding the generated sitemap.
pub const SITEMAP_KEY: &str = "sitemap_xml";

/// Setting category of the generated sitemap.
pub const SITEMAP_CATEGORY: &str = "seo";

/// One `<url>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapRoute {
    /// Path relative to the base URL; empty for the home page.
    pub path: String,
    pub changefreq: &'static str,
    pub priority: &'static str,
}

impl SitemapRoute {
    fn new(path: impl Into<String>, changefreq: &'static str, priority: &'static str) -> Self {
        Self {
            path: path.into(),
            changefreq,
            priority,
        }
    }
}

/// The fixed pages of the site.
#[must_use]
pub fn static_routes() -> Vec<SitemapRoute> {
    vec![
        SitemapRoute::new("", "daily", "1.0"),
        SitemapRoute::new("/services", "weekly", "0.9"),
        SitemapRoute::new("/about", "monthly", "0.8"),
        SitemapRoute::new("/contact", "monthly", "0.8"),
        SitemapRoute::new("/portfolio", "weekly", "0.8"),
    ]
}

/// Static pages followed by one entry per service detail page.
#[must_use]
pub fn routes_for(services: &[Service]) -> Vec<SitemapRoute> {
    let mut routes = static_routes();
    routes.extend(
        services
            .iter()
            .map(|service| SitemapRoute::new(format!("/services/{}", service.slug), "weekly", "0.7")),
    );
    routes
}

/// Render a sitemap document.
#[must_use]
pub fn render(base_url: &str, routes: &[SitemapRoute]) -> String {
    let base_url = base_url.trim_end_matches('/');
    let entries: Vec<String> = routes
        .iter()
        .map(|route| {
            let mut entry = String::from("  <url>\n");
            let _ = writeln!(entry, "    <loc>{}</loc>", escape_xml(&format!("{base_url}{}", route.path)));
            let _ = writeln!(entry, "    <changefreq>{}</changefreq>", route.changefreq);
            let _ = writeln!(entry, "    <priority>{}</priority>", route.priority);
            entry.push_str("  </url>");
            entry
        })
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n\
         {}\n\
         </urlset>",
        entries.join("\n")
    )
}

/// Sitemap served before one has been generated: static pages only.
#[must_use]
pub fn fallback(base_url: &str) -> String {
    render(base_url, &static_routes())
}

fn escape_xml(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_home_and_page() {
        let xml = render(
            "https://techmorpho.in/",
            &[
                SitemapRoute::new("", "daily", "1.0"),
                SitemapRoute::new("/about", "monthly", "0.8"),
            ],
        );
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset"));
        assert!(xml.contains("<loc>https://techmorpho.in</loc>"));
        assert!(xml.contains("<loc>https://techmorpho.in/about</loc>"));
        assert!(xml.contains("<changefreq>monthly</changefreq>\n    <priority>0.8</priority>"));
        assert!(xml.ends_with("  </url>\n</urlset>"));
    }

    #[test]
    fn test_fallback_lists_static_pages() {
        let xml = fallback("https://techmorpho.in");
        assert_eq!(xml.matches("<url>").count(), 5);
        assert!(xml.contains("<loc>https://techmorpho.in/portfolio</loc>"));
    }

    #[test]
    fn test_locations_are_escaped() {
        let xml = render("https://techmorpho.in", &[SitemapRoute::new("/a&b", "weekly", "0.7")]);
        assert!(xml.contains("<loc>https://techmorpho.in/a&amp;b</loc>"));
    }
}
