//! HTML link scanning
//!
//! The scanner only finds raw link strings. Resolution against the page URL,
//! cleaning and validation happen in the extraction stage.

use scraper::{Html, Selector};

/// Yields the raw links found in a document
pub trait LinkScan: Send + Sync {
    fn scan(&self, document: &str) -> Vec<String>;
}

/// Tag-soup scanner built on `scraper`
///
/// # Link Sources
///
/// Images first, then anchors, each in document order:
/// - `<img src="...">`
/// - `<img data-src="a|b|c">` (pipe-separated list)
/// - `<a href="...">`
/// - `<a data-imageurl="a|b">` (pipe-separated list)
///
/// # Example
///
/// ```
/// use crawly::crawler::{HtmlLinkScan, LinkScan};
///
/// let html = r#"<a href="/next">Next</a><img src="/logo.png">"#;
/// assert_eq!(HtmlLinkScan.scan(html), vec!["/logo.png", "/next"]);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlLinkScan;

impl LinkScan for HtmlLinkScan {
    fn scan(&self, document: &str) -> Vec<String> {
        let document = Html::parse_document(document);
        let mut links = Vec::new();

        if let Ok(img_selector) = Selector::parse("img") {
            for element in document.select(&img_selector) {
                let img = element.value();
                if let Some(src) = img.attr("src") {
                    links.push(src.to_string());
                }
                if let Some(list) = img.attr("data-src") {
                    links.extend(split_list(list));
                }
            }
        }

        if let Ok(a_selector) = Selector::parse("a") {
            for element in document.select(&a_selector) {
                let anchor = element.value();
                if let Some(href) = anchor.attr("href") {
                    links.push(href.to_string());
                }
                if let Some(list) = anchor.attr("data-imageurl") {
                    links.extend(split_list(list));
                }
            }
        }

        links
    }
}

fn split_list(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split('|')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(html: &str) -> Vec<String> {
        HtmlLinkScan.scan(html)
    }

    #[test]
    fn test_anchor_href() {
        assert_eq!(
            scan(r#"<html><body><a href="/one">1</a></body></html>"#),
            vec!["/one"]
        );
    }

    #[test]
    fn test_images_before_anchors() {
        let html = r#"
            <html><body>
                <a href="/page">Page</a>
                <img src="/a.png">
                <a href="/other">Other</a>
                <img src="/b.png">
            </body></html>
        "#;
        assert_eq!(scan(html), vec!["/a.png", "/b.png", "/page", "/other"]);
    }

    #[test]
    fn test_data_src_list() {
        let html = r#"<img data-src="/x.jpg|/y.jpg| /z.jpg |">"#;
        assert_eq!(scan(html), vec!["/x.jpg", "/y.jpg", "/z.jpg"]);
    }

    #[test]
    fn test_src_and_data_src() {
        let html = r#"<img src="/thumb.jpg" data-src="/full.jpg">"#;
        assert_eq!(scan(html), vec!["/thumb.jpg", "/full.jpg"]);
    }

    #[test]
    fn test_data_imageurl_list() {
        let html = r#"<a href="/album" data-imageurl="/p1.jpg|/p2.jpg">Album</a>"#;
        assert_eq!(scan(html), vec!["/album", "/p1.jpg", "/p2.jpg"]);
    }

    #[test]
    fn test_raw_links_untouched() {
        // Filtering is the job of validators, not the scanner
        let html = r#"<a href="mailto:x@a.com">m</a><a href="  rel  ">r</a>"#;
        assert_eq!(scan(html), vec!["mailto:x@a.com", "  rel  "]);
    }

    #[test]
    fn test_malformed_html() {
        let html = r#"<a href="/ok">unclosed <img src="/i.png"<p>"#;
        let links = scan(html);
        assert!(links.contains(&"/ok".to_string()));
    }

    #[test]
    fn test_no_links() {
        assert!(scan("<html><body><p>Nothing here</p></body></html>").is_empty());
        assert!(scan("").is_empty());
    }
}
