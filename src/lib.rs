//! Single-page SEO analysis.
//!
//! An [`Analyzer`] obtains a page (URL, local file or raw markup), runs every
//! registered [`Metric`] over it and returns a [`Report`] whose prose is
//! rendered in the requested locale.

pub mod config;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod i18n;
pub mod metric;
pub mod service;

pub use config::{AnalyzerConfig, FetchOptions};
pub use domain::{Document, FetchInfo, MetricResult, MetricValue, NegativeImpact, Report};
pub use error::{AnalyzerError, HttpError, Result};
pub use i18n::Catalog;
pub use metric::{Finding, Message, Metric, MetricError, MetricRegistry};
pub use service::{Analyzer, AnalyzerBuilder, MemoryCache, RawResponse, ResponseCache, Transport};
