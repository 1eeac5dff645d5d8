use std::fmt;

/// Content kinds driving how a fetched resource is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Text or HTML - parsed for links and crawled further
    Hypertext,
    /// Any other concrete media type - persisted as an opaque artifact
    Downloadable,
    /// No usable media type - neither crawled nor persisted
    Unknown,
}

impl ContentKind {
    /// Returns true if links should be extracted from this kind of content
    pub fn is_recursable(&self) -> bool {
        matches!(self, Self::Hypertext)
    }

    /// Returns true if this content should be saved to disk
    pub fn is_downloadable(&self) -> bool {
        matches!(self, Self::Downloadable)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Hypertext => "hypertext",
            Self::Downloadable => "downloadable",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// A parsed `type/subtype` media type, lowercased and without parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    pub top: String,
    pub sub: String,
}

impl MediaType {
    /// Parses a Content-Type header value
    ///
    /// Returns None unless both halves of `type/subtype` are present.
    ///
    /// # Examples
    ///
    /// ```
    /// use crawly::url::MediaType;
    ///
    /// let media = MediaType::parse("Text/HTML; charset=utf-8").unwrap();
    /// assert_eq!(media.top, "text");
    /// assert_eq!(media.sub, "html");
    /// assert!(MediaType::parse("garbage").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let essence = raw.split(';').next()?.trim().to_lowercase();
        let (top, sub) = essence.split_once('/')?;
        let (top, sub) = (top.trim(), sub.trim());

        let valid = |part: &str| {
            !part.is_empty() && !part.contains('/') && !part.chars().any(char::is_whitespace)
        };
        if !valid(top) || !valid(sub) {
            return None;
        }

        Some(Self {
            top: top.to_string(),
            sub: sub.to_string(),
        })
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.top, self.sub)
    }
}

/// The outcome of classifying a URL from its declared media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: ContentKind,
    pub media_type: Option<MediaType>,
}

impl Classification {
    /// Classifies from an optional Content-Type header value
    ///
    /// `text/*` or `*/html` is hypertext, any other well-formed media type is
    /// downloadable, and a missing or malformed value is unknown.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let media_type = match content_type.and_then(MediaType::parse) {
            Some(media_type) => media_type,
            None => return Self::unknown(),
        };

        let kind = if media_type.top == "text" || media_type.sub == "html" {
            ContentKind::Hypertext
        } else {
            ContentKind::Downloadable
        };

        Self {
            kind,
            media_type: Some(media_type),
        }
    }

    /// The classification used when nothing is known about a URL
    pub fn unknown() -> Self {
        Self {
            kind: ContentKind::Unknown,
            media_type: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(content_type: Option<&str>) -> ContentKind {
        Classification::from_content_type(content_type).kind
    }

    #[test]
    fn test_text_html_is_hypertext() {
        assert_eq!(kind_of(Some("text/html")), ContentKind::Hypertext);
        assert_eq!(
            kind_of(Some("text/html; charset=UTF-8")),
            ContentKind::Hypertext
        );
    }

    #[test]
    fn test_any_text_is_hypertext() {
        assert_eq!(kind_of(Some("text/plain")), ContentKind::Hypertext);
        assert_eq!(kind_of(Some("TEXT/CSS")), ContentKind::Hypertext);
    }

    #[test]
    fn test_any_html_subtype_is_hypertext() {
        assert_eq!(kind_of(Some("application/html")), ContentKind::Hypertext);
    }

    #[test]
    fn test_binary_types_are_downloadable() {
        assert_eq!(kind_of(Some("image/png")), ContentKind::Downloadable);
        assert_eq!(kind_of(Some("image/jpeg")), ContentKind::Downloadable);
        assert_eq!(kind_of(Some("application/pdf")), ContentKind::Downloadable);
    }

    #[test]
    fn test_missing_or_malformed_is_unknown() {
        assert_eq!(kind_of(None), ContentKind::Unknown);
        assert_eq!(kind_of(Some("")), ContentKind::Unknown);
        assert_eq!(kind_of(Some("image")), ContentKind::Unknown);
        assert_eq!(kind_of(Some("image/")), ContentKind::Unknown);
        assert_eq!(kind_of(Some("/png")), ContentKind::Unknown);
    }

    #[test]
    fn test_classification_keeps_media_type() {
        let classification = Classification::from_content_type(Some("image/svg+xml"));
        assert_eq!(classification.kind, ContentKind::Downloadable);
        assert_eq!(
            classification.media_type.map(|m| m.to_string()),
            Some("image/svg+xml".to_string())
        );
    }

    #[test]
    fn test_recursable_and_downloadable_flags() {
        assert!(ContentKind::Hypertext.is_recursable());
        assert!(!ContentKind::Downloadable.is_recursable());
        assert!(!ContentKind::Unknown.is_recursable());

        assert!(ContentKind::Downloadable.is_downloadable());
        assert!(!ContentKind::Hypertext.is_downloadable());
        assert!(!ContentKind::Unknown.is_downloadable());
    }
}
