//! Metrics over the document body.

use super::{round2, Finding, Message, Metric, MetricError};
use crate::domain::NegativeImpact;
use crate::extractor::ParsedDocument;

const CONTENT_RATIO_OK: f64 = 10.0;
const CONTENT_RATIO_LOW: f64 = 5.0;

/// H1-H6 structure. The value lists headings as `h2: text`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Headings;

impl Metric for Headings {
    fn name(&self) -> &'static str {
        "Headings"
    }

    fn description_key(&self) -> &'static str {
        "headings.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        _keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        let headings = document.headings();
        let h1 = headings.iter().filter(|h| h.level == 1).count();
        let h2 = headings.iter().filter(|h| h.level == 2).count();

        let (impact, message) = if h1 == 0 {
            (NegativeImpact::High, Message::new("headings.missing_h1"))
        } else if h1 > 1 {
            (NegativeImpact::Low, Message::new("headings.multiple_h1").with("count", h1))
        } else if h2 == 0 {
            (NegativeImpact::Low, Message::new("headings.missing_h2"))
        } else {
            (NegativeImpact::None, Message::new("headings.ok"))
        };

        let value: Vec<String> = headings
            .iter()
            .map(|h| format!("h{}: {}", h.level, h.text))
            .collect();
        Ok(Finding::new(value, impact, message))
    }
}

/// Images without alternative text. The value is the number of such images.
#[derive(Debug, Clone, Copy, Default)]
pub struct AltAttributes;

impl Metric for AltAttributes {
    fn name(&self) -> &'static str {
        "AltAttributes"
    }

    fn description_key(&self) -> &'static str {
        "alt.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        _keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        let images = document.images();
        let total = images.len();
        let missing = images.iter().filter(|i| i.missing_alt()).count();

        let finding = if total == 0 {
            Finding::new(0_i64, NegativeImpact::None, Message::new("alt.no_images"))
        } else if missing == 0 {
            Finding::new(0_i64, NegativeImpact::None, Message::new("alt.ok").with("total", total))
        } else {
            let impact = if missing * 2 > total {
                NegativeImpact::High
            } else {
                NegativeImpact::Medium
            };
            Finding::new(
                missing as i64,
                impact,
                Message::new("alt.missing")
                    .with("missing", missing)
                    .with("total", total),
            )
        };
        Ok(finding)
    }
}

/// Visible text as a percentage of the raw markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentRatio;

impl Metric for ContentRatio {
    fn name(&self) -> &'static str {
        "ContentRatio"
    }

    fn description_key(&self) -> &'static str {
        "content_ratio.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        _keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        let total = document.document().size();
        let text = document.visible_text().len();
        let ratio = if total == 0 {
            0.0
        } else {
            round2(text as f64 / total as f64 * 100.0)
        };

        let (impact, key) = match ratio {
            r if r >= CONTENT_RATIO_OK => (NegativeImpact::None, "content_ratio.ok"),
            r if r >= CONTENT_RATIO_LOW => (NegativeImpact::Low, "content_ratio.low"),
            _ => (NegativeImpact::Medium, "content_ratio.low"),
        };
        Ok(Finding::new(ratio, impact, Message::new(key).with("ratio", ratio)))
    }
}
