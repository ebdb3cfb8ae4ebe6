//! Per-metric results and the report that collects them.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::ops::Index;

/// Raw finding of a metric.
///
/// `Absent` is used when the inspected facet does not exist (no title, no
/// keyword given...) and serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Absent,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

impl MetricValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, MetricValue::Absent)
    }
}

impl From<bool> for MetricValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Vec<String>> for MetricValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

impl<T: Into<MetricValue>> From<Option<T>> for MetricValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Absent, Into::into)
    }
}

/// Severity of a finding, ordered from harmless to severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NegativeImpact {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl NegativeImpact {
    pub fn as_str(&self) -> &'static str {
        match self {
            NegativeImpact::None => "none",
            NegativeImpact::Low => "low",
            NegativeImpact::Medium => "medium",
            NegativeImpact::High => "high",
        }
    }
}

/// One metric's contribution to a report. Field names are the serialization
/// contract consumed by renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub name: String,
    pub description: String,
    pub value: MetricValue,
    pub analysis: String,
    pub negative_impact: NegativeImpact,
}

/// Results of one analysis run, in registry order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    results: Vec<MetricResult>,
}

impl Report {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, result: MetricResult) {
        self.results.push(result);
    }

    pub fn get(&self, name: &str) -> Option<&MetricResult> {
        self.results.iter().find(|r| r.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|r| r.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetricResult> {
        self.results.iter()
    }

    /// Highest impact found across all metrics.
    pub fn worst_impact(&self) -> NegativeImpact {
        self.results
            .iter()
            .map(|r| r.negative_impact)
            .max()
            .unwrap_or_default()
    }
}

impl Index<&str> for Report {
    type Output = MetricResult;

    fn index(&self, name: &str) -> &MetricResult {
        self.get(name)
            .unwrap_or_else(|| panic!("no metric named `{name}` in report"))
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a MetricResult;
    type IntoIter = std::slice::Iter<'a, MetricResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl IntoIterator for Report {
    type Item = MetricResult;
    type IntoIter = std::vec::IntoIter<MetricResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

/// Serialized as a `name -> result` map, keeping registry order.
impl Serialize for Report {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.results.len()))?;
        for result in &self.results {
            map.serialize_entry(&result.name, result)?;
        }
        map.end()
    }
}
