use crate::crawler::Resource;
use crate::hooks::{LinkCleaner, LinkValidator, ParsingHandler};
use crate::url::{has_web_scheme, Identity};
use crate::HookRejection;
use scraper::{Html, Selector};
use url::Url;

/// Drops the `#fragment` part of a link
#[derive(Debug, Default, Clone, Copy)]
pub struct StripFragment;

impl LinkCleaner for StripFragment {
    fn name(&self) -> &'static str {
        "strip-fragment"
    }

    fn clean(&self, link: String, _source: &Identity) -> String {
        match link.split_once('#') {
            Some((head, _)) => head.to_string(),
            None => link,
        }
    }
}

/// Drops the query string of a link
#[derive(Debug, Default, Clone, Copy)]
pub struct StripQuery;

impl LinkCleaner for StripQuery {
    fn name(&self) -> &'static str {
        "strip-query"
    }

    fn clean(&self, link: String, _source: &Identity) -> String {
        match Url::parse(&link) {
            Ok(mut url) => {
                url.set_query(None);
                url.to_string()
            }
            Err(_) => link,
        }
    }
}

/// Keeps only `http` and `https` links
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSchemeValidator;

impl LinkValidator for WebSchemeValidator {
    fn name(&self) -> &'static str {
        "web-scheme"
    }

    fn validate(&self, link: &str) -> Result<(), HookRejection> {
        if has_web_scheme(link) {
            Ok(())
        } else {
            Err(HookRejection::new(self.name(), "not an http(s) link"))
        }
    }
}

/// Collects image candidates from `srcset` attributes
///
/// Each comma-separated candidate contributes its URL; width and density
/// descriptors are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct SrcsetLinks;

impl ParsingHandler for SrcsetLinks {
    fn name(&self) -> &'static str {
        "srcset"
    }

    fn links(&self, document: &str, _resource: &Resource) -> Vec<String> {
        srcset_candidates(document)
    }
}

fn srcset_candidates(document: &str) -> Vec<String> {
    let html = Html::parse_document(document);
    let selector = match Selector::parse("img[srcset], source[srcset]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    html.select(&selector)
        .filter_map(|element| element.value().attr("srcset"))
        .flat_map(|srcset| srcset.split(','))
        .filter_map(|candidate| candidate.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Identity {
        Identity::parse("http://a.com/").unwrap()
    }

    #[test]
    fn test_strip_fragment() {
        assert_eq!(
            StripFragment.clean("http://a.com/p#top".to_string(), &source()),
            "http://a.com/p"
        );
        assert_eq!(
            StripFragment.clean("http://a.com/p".to_string(), &source()),
            "http://a.com/p"
        );
        assert_eq!(StripFragment.clean("#top".to_string(), &source()), "");
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(
            StripQuery.clean("http://a.com/p?x=1#frag".to_string(), &source()),
            "http://a.com/p#frag"
        );
        assert_eq!(
            StripQuery.clean("relative?x=1".to_string(), &source()),
            "relative?x=1"
        );
    }

    #[test]
    fn test_web_scheme_validator() {
        assert!(WebSchemeValidator.validate("http://a.com/").is_ok());
        assert!(WebSchemeValidator.validate("https://a.com/").is_ok());
        assert!(WebSchemeValidator.validate("mailto:x@a.com").is_err());
        assert!(WebSchemeValidator.validate("javascript:void(0)").is_err());
        assert!(WebSchemeValidator.validate("ftp://a.com/f").is_err());
    }

    #[test]
    fn test_srcset_candidates() {
        let html = r#"<html><body>
            <img src="/a.png" srcset="/a-1x.png 1x, /a-2x.png 2x">
            <picture><source srcset="/wide.webp 800w"></picture>
        </body></html>"#;
        assert_eq!(
            srcset_candidates(html),
            vec!["/a-1x.png", "/a-2x.png", "/wide.webp"]
        );
    }

    #[test]
    fn test_srcset_none() {
        assert!(srcset_candidates("<p>no images</p>").is_empty());
    }
}
