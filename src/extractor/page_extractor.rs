use scraper::{Html, Selector};
use std::sync::OnceLock;

use crate::domain::Document;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedHeading {
    pub level: u8,
    pub text: String,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedImage {
    pub src: String,
    pub alt: Option<String>,
    pub is_decorative: bool,
}

impl ExtractedImage {
    /// Decorative images are allowed an empty alt.
    pub fn missing_alt(&self) -> bool {
        match self.alt.as_deref() {
            None => true,
            Some(alt) => alt.is_empty() && !self.is_decorative,
        }
    }
}

/// Elements whose text never reaches the reader.
const HIDDEN_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// A [`Document`] parsed into a queryable tree.
///
/// Every query is total: missing elements come back as `None` or an empty
/// list, never as an error. html5ever recovers from any markup, so parsing
/// itself cannot fail either.
pub struct ParsedDocument<'a> {
    document: &'a Document,
    html: Html,
}

impl std::fmt::Debug for ParsedDocument<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedDocument")
            .field("size", &self.document.size())
            .field("final_url", &self.document.final_url())
            .finish_non_exhaustive()
    }
}

impl<'a> ParsedDocument<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            html: Html::parse_document(document.raw()),
        }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn title(&self) -> Option<String> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("title").unwrap());
        self.html
            .select(selector)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|s| !s.is_empty())
    }

    /// Content of the first `<meta name=...>` matching `name`, case-insensitively.
    pub fn meta(&self, name: &str) -> Option<String> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("meta[name]").unwrap());
        self.html
            .select(selector)
            .find(|el| {
                el.value()
                    .attr("name")
                    .is_some_and(|n| n.trim().eq_ignore_ascii_case(name))
            })
            .and_then(|el| el.value().attr("content"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn meta_description(&self) -> Option<String> {
        self.meta("description")
    }

    pub fn viewport(&self) -> Option<String> {
        self.meta("viewport")
    }

    /// Lowercased robots directives.
    pub fn robots(&self) -> Option<String> {
        self.meta("robots").map(|r| r.to_lowercase())
    }

    pub fn canonical(&self) -> Option<String> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("link[rel][href]").unwrap());
        self.html
            .select(selector)
            .find(|el| {
                el.value().attr("rel").is_some_and(|rel| {
                    rel.split_ascii_whitespace()
                        .any(|r| r.eq_ignore_ascii_case("canonical"))
                })
            })
            .and_then(|el| el.value().attr("href"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Declared document language from `<html lang>`.
    pub fn lang(&self) -> Option<String> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("html[lang]").unwrap());
        self.html
            .select(selector)
            .next()
            .and_then(|el| el.value().attr("lang"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn headings(&self) -> Vec<ExtractedHeading> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());

        self.html
            .select(selector)
            .enumerate()
            .filter_map(|(idx, element)| {
                let tag = element.value().name();
                let level = tag.trim_start_matches('h').parse::<u8>().ok()?;
                let text = collapse_whitespace(&element.text().collect::<String>());

                Some(ExtractedHeading {
                    level,
                    text,
                    position: idx,
                })
            })
            .collect()
    }

    pub fn images(&self) -> Vec<ExtractedImage> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("img").unwrap());

        self.html
            .select(selector)
            .map(|element| {
                let src = element.value().attr("src").unwrap_or("").trim().to_string();
                let alt = element.value().attr("alt").map(|s| s.trim().to_string());
                let is_decorative = element.value().attr("role") == Some("presentation")
                    || element.value().attr("aria-hidden") == Some("true");

                ExtractedImage {
                    src,
                    alt,
                    is_decorative,
                }
            })
            .collect()
    }

    /// Text a reader would see, with script and style contents left out.
    pub fn visible_text(&self) -> String {
        let mut out = String::new();
        for node in self.html.root_element().descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| HIDDEN_TEXT_ELEMENTS.contains(&e.name()))
            });
            if !hidden {
                out.push_str(text);
                out.push(' ');
            }
        }
        collapse_whitespace(&out)
    }

    /// Lowercased words of the visible text.
    pub fn words(&self) -> Vec<String> {
        tokenize(&self.visible_text())
    }
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text into lowercased alphanumeric words.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FetchInfo;
    use std::collections::BTreeMap;

    const PAGE: &str = r##"
        <html lang="pl">
            <head>
                <title>  Example
                    Domain </title>
                <meta name="Description" content=" An example page ">
                <meta name="keywords" content="example, domain, ,test">
                <meta name="viewport" content="width=device-width, initial-scale=1">
                <link rel="canonical" href="https://example.org/">
                <style>body { color: red }</style>
            </head>
            <body>
                <h1>Main</h1>
                <h2>Sub</h2>
                <h3></h3>
                <img src="a.png" alt="A">
                <img src="b.png">
                <img src="c.png" alt="" role="presentation">
                <a href="/about">About us</a>
                <a href="https://other.org/x" title="Other"></a>
                <a href="#top">Top</a>
                <a href="mailto:me@example.org">Mail</a>
                <script>var hidden = "do not count";</script>
                <p>Some visible text here.</p>
            </body>
        </html>
    "##;

    fn fetched(raw: &str) -> Document {
        Document::from_response(
            raw,
            FetchInfo {
                final_url: "https://example.org/index.html".into(),
                status_code: 200,
                redirect_count: 0,
                headers: BTreeMap::new(),
                load_time_ms: 10.0,
            },
        )
    }

    #[test]
    fn test_head_queries() {
        let doc = Document::from_html(PAGE);
        let parsed = doc.parse();
        assert_eq!(parsed.title().as_deref(), Some("Example Domain"));
        assert_eq!(parsed.meta_description().as_deref(), Some("An example page"));
        assert_eq!(parsed.meta("KEYWORDS").as_deref(), Some("example, domain, ,test"));
        assert!(parsed.viewport().unwrap().contains("device-width"));
        assert_eq!(parsed.canonical().as_deref(), Some("https://example.org/"));
        assert_eq!(parsed.lang().as_deref(), Some("pl"));
        assert_eq!(parsed.robots(), None);
    }

    #[test]
    fn test_body_queries() {
        let doc = fetched(PAGE);
        let parsed = doc.parse();

        let headings = parsed.headings();
        assert_eq!(headings.len(), 3);
        assert_eq!(headings[0].level, 1);
        assert_eq!(headings[1].text, "Sub");

        let images = parsed.images();
        assert_eq!(images.len(), 3);
        assert_eq!(images.iter().filter(|i| i.missing_alt()).count(), 1);
        assert_eq!(parsed.document().final_url(), Some("https://example.org/index.html"));
    }

    #[test]
    fn test_visible_text_skips_scripts_and_styles() {
        let doc = Document::from_html(PAGE);
        let text = doc.parse().visible_text();
        assert!(text.contains("Some visible text here."));
        assert!(!text.contains("do not count"));
        assert!(!text.contains("color: red"));
        // anchors with fragment hrefs inside the fixture
        assert!(text.contains("About us Top Mail"));
    }

    #[test]
    fn test_malformed_markup_is_tolerated() {
        let doc =
            Document::from_html("<html lang='en'><body><dif>hrad>><r\"o<!dif? 'dfgdf'''';< html>");
        let parsed = doc.parse();
        assert_eq!(parsed.title(), None);
        assert_eq!(parsed.lang().as_deref(), Some("en"));
        assert!(parsed.headings().is_empty());
        assert!(!parsed.words().is_empty());
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::from_html("");
        let parsed = doc.parse();
        assert_eq!(parsed.title(), None);
        assert_eq!(parsed.lang(), None);
        assert!(parsed.words().is_empty());
        assert!(parsed.images().is_empty());
    }

    #[test]
    fn test_tokenize_keeps_unicode_words() {
        assert_eq!(
            tokenize("Zażółć gęślą, jaźń!"),
            vec!["zażółć", "gęślą", "jaźń"]
        );
    }
}
