//! Keyword-dependent metrics. Without a keyword each of them reports a
//! neutral, not-applicable finding.

use url::Url;

use super::{round2, Finding, Message, Metric, MetricError};
use crate::domain::NegativeImpact;
use crate::extractor::{tokenize, ParsedDocument};

const DENSITY_MIN: f64 = 0.5;
const DENSITY_MAX: f64 = 4.0;

/// Keyword split into lowercased words, `None` when blank or absent.
struct Keyword {
    display: String,
    tokens: Vec<String>,
}

impl Keyword {
    fn parse(keyword: Option<&str>) -> Option<Self> {
        let display = keyword?.trim();
        let tokens = tokenize(display);
        if tokens.is_empty() {
            return None;
        }
        Some(Self {
            display: display.to_string(),
            tokens,
        })
    }

    /// Non-overlapping occurrences of the keyword phrase in `words`.
    fn count_in(&self, words: &[String]) -> usize {
        let n = self.tokens.len();
        let mut count = 0;
        let mut i = 0;
        while i + n <= words.len() {
            if words[i..i + n] == self.tokens[..] {
                count += 1;
                i += n;
            } else {
                i += 1;
            }
        }
        count
    }

    fn found_in(&self, text: &str) -> bool {
        self.count_in(&tokenize(text)) > 0
    }

    fn message(&self, key: &'static str) -> Message {
        Message::new(key).with("keyword", &self.display)
    }
}

fn presence(
    keyword: &Keyword,
    found: bool,
    missing_impact: NegativeImpact,
    keys: [&'static str; 2],
) -> Finding {
    let [found_key, missing_key] = keys;
    if found {
        Finding::new(true, NegativeImpact::None, keyword.message(found_key))
    } else {
        Finding::new(false, missing_impact, keyword.message(missing_key))
    }
}

/// Share of content words taken by the keyword, in percent.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordDensity;

impl Metric for KeywordDensity {
    fn name(&self) -> &'static str {
        "KeywordDensity"
    }

    fn description_key(&self) -> &'static str {
        "keyword_density.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        let Some(keyword) = Keyword::parse(keyword) else {
            return Ok(Finding::not_applicable("common.no_keyword"));
        };
        let words = document.words();
        let occurrences = keyword.count_in(&words);
        let density = if words.is_empty() {
            0.0
        } else {
            round2((occurrences * keyword.tokens.len()) as f64 / words.len() as f64 * 100.0)
        };

        let (impact, key) = if occurrences == 0 {
            (NegativeImpact::High, "keyword_density.absent")
        } else if density < DENSITY_MIN {
            (NegativeImpact::Medium, "keyword_density.low")
        } else if density > DENSITY_MAX {
            (NegativeImpact::Medium, "keyword_density.high")
        } else {
            (NegativeImpact::None, "keyword_density.ok")
        };
        Ok(Finding::new(density, impact, keyword.message(key).with("density", density)))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordTitle;

impl Metric for KeywordTitle {
    fn name(&self) -> &'static str {
        "KeywordTitle"
    }

    fn description_key(&self) -> &'static str {
        "keyword_title.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        let Some(keyword) = Keyword::parse(keyword) else {
            return Ok(Finding::not_applicable("common.no_keyword"));
        };
        let found = document.title().is_some_and(|t| keyword.found_in(&t));
        Ok(presence(
            &keyword,
            found,
            NegativeImpact::High,
            ["keyword_title.found", "keyword_title.missing"],
        ))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordDescription;

impl Metric for KeywordDescription {
    fn name(&self) -> &'static str {
        "KeywordDescription"
    }

    fn description_key(&self) -> &'static str {
        "keyword_description.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        let Some(keyword) = Keyword::parse(keyword) else {
            return Ok(Finding::not_applicable("common.no_keyword"));
        };
        let found = document
            .meta_description()
            .is_some_and(|d| keyword.found_in(&d));
        Ok(presence(
            &keyword,
            found,
            NegativeImpact::Medium,
            ["keyword_description.found", "keyword_description.missing"],
        ))
    }
}

/// Keyword in H1-H3. The value is the number of headings containing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordHeadings;

impl Metric for KeywordHeadings {
    fn name(&self) -> &'static str {
        "KeywordHeadings"
    }

    fn description_key(&self) -> &'static str {
        "keyword_headings.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        let Some(keyword) = Keyword::parse(keyword) else {
            return Ok(Finding::not_applicable("common.no_keyword"));
        };
        let count = document
            .headings()
            .iter()
            .filter(|h| h.level <= 3 && keyword.found_in(&h.text))
            .count();
        Ok(if count > 0 {
            Finding::new(
                count as i64,
                NegativeImpact::None,
                keyword.message("keyword_headings.found").with("count", count),
            )
        } else {
            Finding::new(0_i64, NegativeImpact::Medium, keyword.message("keyword_headings.missing"))
        })
    }
}

/// Keyword in the path of the final URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordUrl;

impl Metric for KeywordUrl {
    fn name(&self) -> &'static str {
        "KeywordUrl"
    }

    fn description_key(&self) -> &'static str {
        "keyword_url.description"
    }

    fn inspect(
        &self,
        document: &ParsedDocument<'_>,
        keyword: Option<&str>,
    ) -> Result<Finding, MetricError> {
        let Some(keyword) = Keyword::parse(keyword) else {
            return Ok(Finding::not_applicable("common.no_keyword"));
        };
        let Some(url) = document.document().final_url() else {
            return Ok(Finding::not_applicable("common.not_fetched"));
        };

        // Hosts count too: "keyword.com" is as good as "/keyword".
        let haystack = match Url::parse(url) {
            Ok(u) => format!("{} {}", u.host_str().unwrap_or_default(), u.path()),
            Err(_) => url.to_string(),
        };
        Ok(presence(
            &keyword,
            keyword.found_in(&haystack),
            NegativeImpact::Low,
            ["keyword_url.found", "keyword_url.missing"],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Document, MetricValue};
    use crate::metric::test_support::{fetched, inspect};

    const PAGE: &str = r#"
        <html>
            <head>
                <title>Rust keyword guide</title>
                <meta name="description" content="Everything about keyword research">
            </head>
            <body>
                <h1>Keyword basics</h1>
                <h2>Tools</h2>
                <h4>Keyword footnote</h4>
                <p>One keyword in a sentence with quite a few other words around it
                    to keep density sane.</p>
                <p>Another sentence without it but with many more words to dilute
                    the count further still.</p>
            </body>
        </html>
    "#;

    #[test]
    fn test_without_keyword_every_metric_is_neutral() {
        let doc = Document::from_html(PAGE);
        let metrics: [&dyn Metric; 5] = [
            &KeywordDensity,
            &KeywordTitle,
            &KeywordDescription,
            &KeywordHeadings,
            &KeywordUrl,
        ];
        for metric in metrics {
            for keyword in [None, Some(""), Some("  ,  ")] {
                let finding = inspect(metric, &doc, keyword);
                assert!(finding.value.is_absent(), "{}", metric.name());
                assert_eq!(finding.impact, NegativeImpact::None);
                assert_eq!(finding.message.key, "common.no_keyword");
            }
        }
    }

    #[test]
    fn test_phrase_counting() {
        let kw = Keyword::parse(Some("Keyword Research")).unwrap();
        let words = tokenize("keyword research, more keyword; keyword research keyword-research");
        assert_eq!(kw.count_in(&words), 3);
        assert_eq!(kw.message("x").params, vec![("keyword", "Keyword Research".to_string())]);
    }

    #[test]
    fn test_density() {
        let doc = Document::from_html(PAGE);
        let finding = inspect(&KeywordDensity, &doc, Some("keyword"));
        let MetricValue::Float(density) = finding.value else {
            panic!("expected a float density");
        };
        assert!(density > DENSITY_MIN && density < DENSITY_MAX * 3.0);

        let absent = inspect(&KeywordDensity, &doc, Some("python"));
        assert_eq!(absent.impact, NegativeImpact::High);
        assert_eq!(absent.value, MetricValue::Float(0.0));

        let stuffed = Document::from_html("<p>spam spam spam eggs</p>");
        let finding = inspect(&KeywordDensity, &stuffed, Some("spam"));
        assert_eq!(finding.value, MetricValue::Float(75.0));
        assert_eq!(finding.message.key, "keyword_density.high");
    }

    #[test]
    fn test_presence_in_title_description_headings() {
        let doc = Document::from_html(PAGE);
        assert_eq!(inspect(&KeywordTitle, &doc, Some("KEYWORD")).value, MetricValue::Boolean(true));
        assert_eq!(
            inspect(&KeywordDescription, &doc, Some("keyword research")).value,
            MetricValue::Boolean(true)
        );
        // h4 does not count
        assert_eq!(inspect(&KeywordHeadings, &doc, Some("keyword")).value, MetricValue::Integer(1));
        let finding = inspect(&KeywordHeadings, &doc, Some("footnote"));
        assert_eq!(finding.impact, NegativeImpact::Medium);

        let missing = inspect(&KeywordTitle, &doc, Some("python"));
        assert_eq!(missing.value, MetricValue::Boolean(false));
        assert_eq!(missing.impact, NegativeImpact::High);
    }

    #[test]
    fn test_keyword_in_url() {
        let doc = fetched(PAGE, "https://example.org/guides/keyword-research", 0, 1.0);
        assert_eq!(
            inspect(&KeywordUrl, &doc, Some("keyword research")).value,
            MetricValue::Boolean(true)
        );
        let finding = inspect(&KeywordUrl, &doc, Some("python"));
        assert_eq!(finding.impact, NegativeImpact::Low);

        let local = Document::from_html(PAGE);
        let finding = inspect(&KeywordUrl, &local, Some("keyword"));
        assert_eq!(finding.message.key, "common.not_fetched");
    }
}
