//! Metrics about the response itself rather than its markup.

use url::Url;

use super::{round2, Finding, Message, Metric, MetricError};
use crate::domain::NegativeImpact;
use crate::extractor::ParsedDocument;

const KB: usize = 1024;
const SIZE_LIMIT: usize = 100 * KB;
const SIZE_LOW_LIMIT: usize = 200 * KB;
const SIZE_MEDIUM_LIMIT: usize = 500 * KB;

const LOAD_TIME_OK_MS: f64 = 1000.0;
const LOAD_TIME_LOW_MS: f64 = 3000.0;
const LOAD_TIME_MEDIUM_MS: f64 = 5000.0;

const URL_LENGTH_LIMIT: usize = 75;
const URL_LENGTH_LOW_LIMIT: usize = 115;

/// Byte size of the markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct Size;

impl Metric for Size {
    fn name(&self) -> &'static str {
        "Size"
    }

    fn description_key(&self) -> &'static str {
        "size.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        _keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        let size = document.document().size();
        let impact = match size {
            s if s <= SIZE_LIMIT => NegativeImpact::None,
            s if s <= SIZE_LOW_LIMIT => NegativeImpact::Low,
            s if s <= SIZE_MEDIUM_LIMIT => NegativeImpact::Medium,
            _ => NegativeImpact::High,
        };
        let message = if impact == NegativeImpact::None {
            Message::new("size.ok")
        } else {
            Message::new("size.too_big")
                .with("size", size.div_ceil(KB))
                .with("limit", SIZE_LIMIT / KB)
        };
        Ok(Finding::new(size as i64, impact, message))
    }
}

/// Redirects followed before the final page.
#[derive(Debug, Clone, Copy, Default)]
pub struct Redirect;

impl Metric for Redirect {
    fn name(&self) -> &'static str {
        "Redirect"
    }

    fn description_key(&self) -> &'static str {
        "redirect.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        _keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        let count = document.document().redirect_count();
        let finding = match count {
            0 => Finding::new(0_i64, NegativeImpact::None, Message::new("redirect.none")),
            1 => Finding::new(
                1_i64,
                NegativeImpact::Medium,
                Message::new("redirect.found").with("count", count),
            ),
            n => Finding::new(
                i64::from(n),
                NegativeImpact::High,
                Message::new("redirect.found").with("count", n),
            ),
        };
        Ok(finding)
    }
}

/// Download time in milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadTime;

impl Metric for LoadTime {
    fn name(&self) -> &'static str {
        "LoadTime"
    }

    fn description_key(&self) -> &'static str {
        "load_time.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        _keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        let Some(ms) = document.document().load_time_ms() else {
            return Ok(Finding::not_applicable("common.not_fetched"));
        };
        let impact = match ms {
            t if t <= LOAD_TIME_OK_MS => NegativeImpact::None,
            t if t <= LOAD_TIME_LOW_MS => NegativeImpact::Low,
            t if t <= LOAD_TIME_MEDIUM_MS => NegativeImpact::Medium,
            _ => NegativeImpact::High,
        };
        let seconds = format!("{:.2}", ms / 1000.0);
        let message = if impact == NegativeImpact::None {
            Message::new("load_time.ok").with("seconds", seconds)
        } else {
            Message::new("load_time.slow")
                .with("seconds", seconds)
                .with("limit", LOAD_TIME_OK_MS / 1000.0)
        };
        Ok(Finding::new(round2(ms), impact, message))
    }
}

/// HTTPS on the final URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ssl;

impl Metric for Ssl {
    fn name(&self) -> &'static str {
        "Ssl"
    }

    fn description_key(&self) -> &'static str {
        "ssl.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        _keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        let Some(url) = document.document().final_url() else {
            return Ok(Finding::not_applicable("common.not_fetched"));
        };
        let secure = Url::parse(url).is_ok_and(|u| u.scheme() == "https");
        Ok(if secure {
            Finding::new(true, NegativeImpact::None, Message::new("ssl.ok"))
        } else {
            Finding::new(false, NegativeImpact::High, Message::new("ssl.missing"))
        })
    }
}

/// Character length of the final URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlLength;

impl Metric for UrlLength {
    fn name(&self) -> &'static str {
        "UrlLength"
    }

    fn description_key(&self) -> &'static str {
        "url_length.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        _keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        let Some(url) = document.document().final_url() else {
            return Ok(Finding::not_applicable("common.not_fetched"));
        };
        let length = url.chars().count();
        let finding = match length {
            l if l <= URL_LENGTH_LIMIT => Finding::new(
                l as i64,
                NegativeImpact::None,
                Message::new("url_length.ok").with("length", l),
            ),
            l => Finding::new(
                l as i64,
                if l <= URL_LENGTH_LOW_LIMIT {
                    NegativeImpact::Low
                } else {
                    NegativeImpact::Medium
                },
                Message::new("url_length.too_long")
                    .with("length", l)
                    .with("limit", URL_LENGTH_LIMIT),
            ),
        };
        Ok(finding)
    }
}
