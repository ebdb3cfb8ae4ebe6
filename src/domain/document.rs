//! The page under analysis.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::extractor::ParsedDocument;

/// Response metadata, present only for documents that came from the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchInfo {
    pub final_url: String,
    pub status_code: u16,
    pub redirect_count: u32,
    /// Header names are lowercased.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub load_time_ms: f64,
}

/// Raw markup plus whatever the transport learned about it.
///
/// A document is immutable once built. The queryable tree is not built here:
/// [`Document::parse`] derives it on demand, once per analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    raw: String,
    fetch: Option<FetchInfo>,
}

impl Document {
    /// Build a document from markup. Never fails, whatever the markup looks like.
    pub fn from_html(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            fetch: None,
        }
    }

    pub fn from_response(raw: impl Into<String>, fetch: FetchInfo) -> Self {
        Self {
            raw: raw.into(),
            fetch: Some(fetch),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Size of the raw markup in bytes.
    pub fn size(&self) -> usize {
        self.raw.len()
    }

    pub fn fetch_info(&self) -> Option<&FetchInfo> {
        self.fetch.as_ref()
    }

    pub fn final_url(&self) -> Option<&str> {
        self.fetch.as_ref().map(|f| f.final_url.as_str())
    }

    /// Zero for documents not obtained over the network.
    pub fn redirect_count(&self) -> u32 {
        self.fetch.as_ref().map_or(0, |f| f.redirect_count)
    }

    pub fn load_time_ms(&self) -> Option<f64> {
        self.fetch.as_ref().map(|f| f.load_time_ms)
    }

    /// Parse the markup into a queryable tree.
    pub fn parse(&self) -> ParsedDocument<'_> {
        ParsedDocument::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetched() -> Document {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "text/html; charset=utf-8".to_string());
        Document::from_response(
            "<html></html>",
            FetchInfo {
                final_url: "https://example.org/".into(),
                status_code: 200,
                redirect_count: 2,
                headers,
                load_time_ms: 120.0,
            },
        )
    }

    #[test]
    fn string_documents_have_no_fetch_metadata() {
        let doc = Document::from_html("<p>hi");
        assert_eq!(doc.size(), 5);
        assert_eq!(doc.final_url(), None);
        assert!(doc.fetch_info().is_none());
        assert_eq!(doc.redirect_count(), 0);
        assert_eq!(doc.load_time_ms(), None);
    }

    #[test]
    fn fetched_documents_expose_response_metadata() {
        let doc = fetched();
        assert_eq!(doc.final_url(), Some("https://example.org/"));
        assert_eq!(doc.redirect_count(), 2);
        assert_eq!(doc.load_time_ms(), Some(120.0));
        let info = doc.fetch_info().unwrap();
        assert_eq!(info.status_code, 200);
        assert_eq!(
            info.headers.get("content-type").map(String::as_str),
            Some("text/html; charset=utf-8")
        );
    }
}
