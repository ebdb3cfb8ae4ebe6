use std::collections::HashSet;

use super::{
    AltAttributes, Canonical, ContentRatio, Description, Headings, KeywordDensity,
    KeywordDescription, KeywordHeadings, KeywordTitle, KeywordUrl, Language, LoadTime, Metric,
    Redirect, Robots, Size, Ssl, Title, UrlLength, Viewport,
};
use crate::error::{AnalyzerError, Result};

/// Ordered, duplicate-free set of metrics. Reports follow registry order.
#[derive(Debug)]
pub struct MetricRegistry {
    metrics: Vec<Box<dyn Metric>>,
}

impl MetricRegistry {
    /// Build a registry, rejecting duplicate names.
    pub fn new(metrics: Vec<Box<dyn Metric>>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(metrics.len());
        for metric in &metrics {
            if !seen.insert(metric.name()) {
                return Err(AnalyzerError::DuplicateMetric(metric.name().to_string()));
            }
        }
        Ok(Self { metrics })
    }

    /// Every built-in metric, in report order.
    pub fn standard() -> Self {
        Self {
            metrics: vec![
                Box::new(Size),
                Box::new(Redirect),
                Box::new(LoadTime),
                Box::new(Ssl),
                Box::new(UrlLength),
                Box::new(Title),
                Box::new(Description),
                Box::new(Headings),
                Box::new(AltAttributes),
                Box::new(ContentRatio),
                Box::new(Language),
                Box::new(Viewport),
                Box::new(Canonical),
                Box::new(Robots),
                Box::new(KeywordDensity),
                Box::new(KeywordTitle),
                Box::new(KeywordDescription),
                Box::new(KeywordHeadings),
                Box::new(KeywordUrl),
            ],
        }
    }

    /// Append a metric, rejecting a name already registered.
    pub fn register(&mut self, metric: Box<dyn Metric>) -> Result<()> {
        if self.get(metric.name()).is_some() {
            return Err(AnalyzerError::DuplicateMetric(metric.name().to_string()));
        }
        self.metrics.push(metric);
        Ok(())
    }

    pub fn all(&self) -> &[Box<dyn Metric>] {
        &self.metrics
    }

    pub fn get(&self, name: &str) -> Option<&dyn Metric> {
        self.metrics
            .iter()
            .find(|m| m.name() == name)
            .map(|m| m.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.metrics.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
