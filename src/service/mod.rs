pub mod analyzer;
pub mod cache;
pub mod fetcher;
pub mod http;

pub use analyzer::{Analyzer, AnalyzerBuilder};
pub use cache::{cache_key, MemoryCache, ResponseCache};
pub use fetcher::PageFetcher;
pub use http::{create_client, RawResponse, ReqwestTransport, Transport};
