pub mod document;
pub mod report;

pub use document::{Document, FetchInfo};
pub use report::{MetricResult, MetricValue, NegativeImpact, Report};
