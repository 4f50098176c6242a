use crate::error::{Result, ScanError};
use scraper::{Html, Selector};

/// Parsed HTML document with the lookups probes need.
///
/// `scraper::Html` is not `Send`, so a page must be built and consumed
/// between awaits, never held across one.
pub struct HtmlPage {
    document: Html,
}

impl HtmlPage {
    pub fn parse(body: &str) -> Self {
        Self {
            document: Html::parse_document(body),
        }
    }

    /// `content` of `<meta property="...">`, e.g. Open Graph tags.
    pub fn meta_property(&self, property: &str) -> Option<String> {
        self.first_attr(&format!(r#"meta[property="{property}"]"#), "content")
            .ok()
            .flatten()
    }

    /// `content` of `<meta name="...">`.
    pub fn meta_name(&self, name: &str) -> Option<String> {
        self.first_attr(&format!(r#"meta[name="{name}"]"#), "content")
            .ok()
            .flatten()
    }

    /// Trimmed text of the first element matching `css`, if non-empty.
    pub fn first_text(&self, css: &str) -> Result<Option<String>> {
        let selector = parse_selector(css)?;
        Ok(self
            .document
            .select(&selector)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|text| !text.is_empty()))
    }

    /// Trimmed attribute value of the first element matching `css`, if non-empty.
    pub fn first_attr(&self, css: &str, attr: &str) -> Result<Option<String>> {
        let selector = parse_selector(css)?;
        Ok(self
            .document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty()))
    }

    pub fn count(&self, css: &str) -> Result<usize> {
        let selector = parse_selector(css)?;
        Ok(self.document.select(&selector).count())
    }

    /// Document `<title>`.
    pub fn title(&self) -> Option<String> {
        self.first_text("title").ok().flatten()
    }

    /// All text nodes joined by single spaces.
    pub fn text(&self) -> String {
        collapse_whitespace(&self.document.root_element().text().collect::<Vec<_>>().join(" "))
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScanError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
