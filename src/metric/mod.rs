//! Page metrics.
//!
//! A metric inspects one facet of a parsed document and reports a
//! locale-independent [`Finding`]. Rendering the finding's message into prose
//! is left to [`Metric::evaluate`], so translating a report never changes its
//! values or impacts.

mod content;
mod keyword;
mod meta;
mod page;
mod registry;

pub use content::{AltAttributes, ContentRatio, Headings};
pub use keyword::{KeywordDensity, KeywordDescription, KeywordHeadings, KeywordTitle, KeywordUrl};
pub use meta::{Canonical, Description, Language, Robots, Title, Viewport};
pub use page::{LoadTime, Redirect, Size, Ssl, UrlLength};
pub use registry::MetricRegistry;

use thiserror::Error;

use crate::domain::{MetricResult, MetricValue, NegativeImpact};
use crate::error::{AnalyzerError, Result};
use crate::extractor::ParsedDocument;
use crate::i18n::Catalog;

/// A message key plus the parameters its template expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub key: &'static str,
    pub params: Vec<(&'static str, String)>,
}

impl Message {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            params: Vec::new(),
        }
    }

    pub fn with(mut self, name: &'static str, value: impl ToString) -> Self {
        self.params.push((name, value.to_string()));
        self
    }
}

/// What a metric found, before localization.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub value: MetricValue,
    pub impact: NegativeImpact,
    pub message: Message,
}

impl Finding {
    pub fn new(value: impl Into<MetricValue>, impact: NegativeImpact, message: Message) -> Self {
        Self {
            value: value.into(),
            impact,
            message,
        }
    }

    /// Neutral result for checks that do not apply to this document.
    pub fn not_applicable(key: &'static str) -> Self {
        Self::new(MetricValue::Absent, NegativeImpact::None, Message::new(key))
    }
}

/// A metric could not produce a finding. Metrics are expected to be total, so
/// this always indicates a bug in the metric.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MetricError(pub String);

impl MetricError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// A named page-inspection rule.
pub trait Metric: Send + Sync {
    /// Stable identifier, unique within a registry.
    fn name(&self) -> &'static str;

    /// Catalog key of the metric's description.
    fn description_key(&self) -> &'static str;

    /// Inspect the document. Must not fail on empty or malformed markup and
    /// must accept a missing keyword.
    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        keyword: Option<&str>,
    ) -> std::result::Result<Finding, MetricError>;

    /// Inspect the document and render the finding for `locale`.
    fn evaluate(
        &self,
        document: &ParsedDocument<'_>,
        keyword: Option<&str>,
        locale: &str,
        catalog: &Catalog,
    ) -> Result<MetricResult> {
        let finding = self
            .inspect(document, keyword)
            .map_err(|e| AnalyzerError::metric(self.name(), e.to_string()))?;
        let analysis = catalog.render(locale, finding.message.key, &finding.message.params)?;
        let description = catalog.render(locale, self.description_key(), &[])?;

        Ok(MetricResult {
            name: self.name().to_string(),
            description,
            value: finding.value,
            analysis,
            negative_impact: finding.impact,
        })
    }
}

impl std::fmt::Debug for dyn Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Metric").field(&self.name()).finish()
    }
}

/// Round to two decimal places for display and stable values.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Document;

    struct Broken;

    impl Metric for Broken {
        fn name(&self) -> &'static str {
            "Broken"
        }

        fn description_key(&self) -> &'static str {
            "size.description"
        }

        fn inspect(
            &self,
            _document: &ParsedDocument<'_>,
            _keyword: Option<&str>,
        ) -> std::result::Result<Finding, MetricError> {
            Err(MetricError::new("selector exploded"))
        }
    }

    #[test]
    fn evaluate_renders_in_requested_locale() {
        let catalog = Catalog::builtin().unwrap();
        let doc = Document::from_html(r#"<html lang="en"></html>"#);
        let parsed = doc.parse();

        let en = Size.evaluate(&parsed, None, "en_US", &catalog).unwrap();
        let pl = Size.evaluate(&parsed, None, "pl_PL", &catalog).unwrap();
        assert_eq!(en.analysis, "The size of your page is ok");
        assert_eq!(pl.analysis, "Rozmiar strony jest w porządku");
        assert_eq!(en.value, pl.value);
        assert_eq!(en.negative_impact, pl.negative_impact);
        assert_ne!(en.description, pl.description);
    }

    #[test]
    fn evaluate_wraps_metric_errors_with_the_metric_name() {
        let catalog = Catalog::builtin().unwrap();
        let doc = Document::from_html("");
        let err = Broken.evaluate(&doc.parse(), None, "en", &catalog).unwrap_err();
        match err {
            AnalyzerError::MetricEvaluation { metric, message } => {
                assert_eq!(metric, "Broken");
                assert_eq!(message, "selector exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn message_builder_keeps_parameter_order() {
        let msg = Message::new("alt.missing").with("missing", 2).with("total", 5);
        assert_eq!(msg.params, vec![("missing", "2".to_string()), ("total", "5".to_string())]);
    }
}
