//! Error types for the SEO analyzer.
//!
//! This module provides structured error handling with:
//! - `HttpError`: Transport-level failures while fetching a page
//! - `AnalyzerError`: Everything that can abort an `analyze*` call
//! - `Result<T>`: Type alias for Results using AnalyzerError

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// TRANSPORT ERROR TYPE
// ============================================================================

/// Failures reported by a [`Transport`](crate::service::Transport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// URL could not be parsed or is not absolute http(s)
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// DNS failure, refused connection, TLS failure, broken body...
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Whole request (redirect chain included) exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Redirect chain longer than the configured maximum
    #[error("Too many redirects (limit {0})")]
    TooManyRedirects(usize),

    /// Final response after redirects was not 2xx
    #[error("Unexpected HTTP status {0}")]
    Status(u16),
}

impl HttpError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionFailed(msg.into())
    }

    /// Short machine-friendly name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            HttpError::InvalidUrl(_) => "invalid_url",
            HttpError::ConnectionFailed(_) => "connection_failed",
            HttpError::Timeout(_) => "timeout",
            HttpError::TooManyRedirects(_) => "too_many_redirects",
            HttpError::Status(_) => "status",
        }
    }
}

// ============================================================================
// DOMAIN ERROR TYPE
// ============================================================================

/// Errors that abort an analysis run. There is no partial report: either every
/// metric produced a result or one of these is returned.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The page could not be obtained from the network
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: HttpError,
    },

    /// Local file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `analyze` called before any document was supplied
    #[error("No document to analyze; supply one with `with_document` or use an analyze_* source")]
    NoDocument,

    /// Key absent from the requested locale, its language and the fallback
    #[error("Missing translation for key `{key}` (locale {locale})")]
    MissingTranslation { locale: String, key: String },

    /// A metric broke its contract of always producing a result
    #[error("Metric `{metric}` failed: {message}")]
    MetricEvaluation { metric: String, message: String },

    /// Two metrics registered under one name
    #[error("Duplicate metric name: {0}")]
    DuplicateMetric(String),

    /// Translation catalog could not be loaded
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Invalid analyzer configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AnalyzerError {
    /// Create a fetch error
    pub fn fetch(url: impl Into<String>, source: HttpError) -> Self {
        Self::Fetch { url: url.into(), source }
    }

    /// Create an IO error for `path`
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }

    /// Create a metric evaluation error
    pub fn metric(metric: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MetricEvaluation { metric: metric.into(), message: message.into() }
    }

    pub fn missing_translation(locale: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingTranslation { locale: locale.into(), key: key.into() }
    }
}

/// Result type alias using AnalyzerError.
pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_names_url_and_cause() {
        let err = AnalyzerError::fetch(
            "invalid-url",
            HttpError::InvalidUrl("relative URL without a base".into()),
        );
        let msg = err.to_string();
        assert!(msg.contains("invalid-url"));
        assert!(msg.contains("relative URL without a base"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn http_error_kinds_are_stable() {
        assert_eq!(HttpError::Timeout(Duration::from_secs(1)).kind(), "timeout");
        assert_eq!(HttpError::TooManyRedirects(10).kind(), "too_many_redirects");
        assert_eq!(HttpError::Status(404).to_string(), "Unexpected HTTP status 404");
    }
}
