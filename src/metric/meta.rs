//! Metrics over the document head.

use super::{Finding, Message, Metric, MetricError};
use crate::domain::{MetricValue, NegativeImpact};
use crate::extractor::ParsedDocument;

const TITLE_MIN: usize = 10;
const TITLE_MAX: usize = 70;
const DESCRIPTION_MIN: usize = 50;
const DESCRIPTION_MAX: usize = 160;

/// Language assumed when the page declares none.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Shared length check for title-like texts.
fn length_finding(
    text: Option<String>,
    min: usize,
    max: usize,
    keys: [&'static str; 4],
) -> Finding {
    let [missing, too_short, too_long, ok] = keys;
    let Some(text) = text else {
        return Finding::new(MetricValue::Absent, NegativeImpact::High, Message::new(missing));
    };
    let length = text.chars().count();
    let (impact, key) = if length < min {
        (NegativeImpact::Medium, too_short)
    } else if length > max {
        (NegativeImpact::Medium, too_long)
    } else {
        (NegativeImpact::None, ok)
    };
    let message = Message::new(key)
        .with("length", length)
        .with("min", min)
        .with("max", max);
    Finding::new(text, impact, message)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Title;

impl Metric for Title {
    fn name(&self) -> &'static str {
        "Title"
    }

    fn description_key(&self) -> &'static str {
        "title.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        _keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        Ok(length_finding(
            document.title(),
            TITLE_MIN,
            TITLE_MAX,
            ["title.missing", "title.too_short", "title.too_long", "title.ok"],
        ))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Description;

impl Metric for Description {
    fn name(&self) -> &'static str {
        "Description"
    }

    fn description_key(&self) -> &'static str {
        "description.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        _keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        Ok(length_finding(
            document.meta_description(),
            DESCRIPTION_MIN,
            DESCRIPTION_MAX,
            [
                "description.missing",
                "description.too_short",
                "description.too_long",
                "description.ok",
            ],
        ))
    }
}

/// Declared `<html lang>`, defaulting to English.
#[derive(Debug, Clone, Copy, Default)]
pub struct Language;

impl Metric for Language {
    fn name(&self) -> &'static str {
        "Language"
    }

    fn description_key(&self) -> &'static str {
        "language.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        _keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        Ok(match document.lang() {
            Some(lang) => Finding::new(
                lang.clone(),
                NegativeImpact::None,
                Message::new("language.declared").with("lang", lang),
            ),
            None => Finding::new(
                DEFAULT_LANGUAGE,
                NegativeImpact::Low,
                Message::new("language.missing").with("lang", DEFAULT_LANGUAGE),
            ),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Viewport;

impl Metric for Viewport {
    fn name(&self) -> &'static str {
        "Viewport"
    }

    fn description_key(&self) -> &'static str {
        "viewport.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        _keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        Ok(match document.viewport() {
            Some(v) if v.replace(' ', "").contains("width=device-width") => {
                Finding::new(v, NegativeImpact::None, Message::new("viewport.ok"))
            }
            Some(v) => Finding::new(
                v,
                NegativeImpact::Medium,
                Message::new("viewport.not_responsive"),
            ),
            None => Finding::new(
                MetricValue::Absent,
                NegativeImpact::High,
                Message::new("viewport.missing"),
            ),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Canonical;

impl Metric for Canonical {
    fn name(&self) -> &'static str {
        "Canonical"
    }

    fn description_key(&self) -> &'static str {
        "canonical.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        _keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        Ok(match document.canonical() {
            Some(url) => Finding::new(
                url.clone(),
                NegativeImpact::None,
                Message::new("canonical.ok").with("url", url),
            ),
            None => Finding::new(
                MetricValue::Absent,
                NegativeImpact::Low,
                Message::new("canonical.missing"),
            ),
        })
    }
}

/// `noindex` in the robots meta tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct Robots;

impl Metric for Robots {
    fn name(&self) -> &'static str {
        "Robots"
    }

    fn description_key(&self) -> &'static str {
        "robots.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        _keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        let robots = document.robots();
        let noindex = robots.as_deref().is_some_and(|r| {
            r.split(',').any(|d| matches!(d.trim(), "noindex" | "none"))
        });
        Ok(if noindex {
            Finding::new(robots, NegativeImpact::High, Message::new("robots.noindex"))
        } else {
            Finding::new(robots, NegativeImpact::None, Message::new("robots.ok"))
        })
    }
}
