//! The analysis entry point: resolves a document, runs every registered
//! metric over it and assembles the localized report.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use super::cache::{MemoryCache, ResponseCache};
use super::fetcher::PageFetcher;
use super::http::{ReqwestTransport, Transport};
use crate::config::AnalyzerConfig;
use crate::domain::{Document, Report};
use crate::error::{AnalyzerError, Result};
use crate::i18n::Catalog;
use crate::metric::{Metric, MetricRegistry};

/// Stages of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Uninitialized,
    DocumentResolved,
    MetricsRun,
    Reported,
    Failed,
}

struct Run {
    state: RunState,
}

impl Run {
    fn new() -> Self {
        Self {
            state: RunState::Uninitialized,
        }
    }

    fn advance(&mut self, next: RunState) {
        debug_assert!(
            matches!(
                (self.state, next),
                (RunState::Uninitialized, RunState::DocumentResolved)
                    | (RunState::DocumentResolved, RunState::MetricsRun)
                    | (RunState::MetricsRun, RunState::Reported)
                    | (_, RunState::Failed)
            ),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!("[ANALYZER] {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Marks the run failed on error and passes the result through.
    fn check<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            tracing::warn!("[ANALYZER] Run failed in {:?}: {}", self.state, e);
            self.advance(RunState::Failed);
        }
        result
    }
}

pub struct Analyzer {
    registry: MetricRegistry,
    catalog: Arc<Catalog>,
    fetcher: PageFetcher,
    config: AnalyzerConfig,
    document: Option<Document>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("metrics", &self.registry.names())
            .field("locales", &self.catalog.locales())
            .field("config", &self.config)
            .field("has_document", &self.document.is_some())
            .finish()
    }
}

impl Analyzer {
    /// Analyzer with the standard metrics, built-in translations and a
    /// reqwest transport.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::default()
    }

    /// Sets the document `analyze` runs over.
    pub fn with_document(mut self, document: Document) -> Self {
        self.document = Some(document);
        self
    }

    pub fn set_document(&mut self, document: Document) {
        self.document = Some(document);
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn metrics(&self) -> &[Box<dyn Metric>] {
        self.registry.all()
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Drops every cached response.
    pub fn clear_cache(&self) {
        self.fetcher.cache().clear();
    }

    /// Analyzes the document set with [`with_document`](Self::with_document).
    ///
    /// `locale` defaults to the configured one; a blank keyword counts as none.
    pub fn analyze(&self, keyword: Option<&str>, locale: Option<&str>) -> Result<Report> {
        let mut run = Run::new();
        let document = run.check(self.document.as_ref().ok_or(AnalyzerError::NoDocument))?;
        run.advance(RunState::DocumentResolved);
        self.run(&mut run, document, keyword, locale)
    }

    pub fn analyze_document(
        &self,
        document: &Document,
        keyword: Option<&str>,
        locale: Option<&str>,
    ) -> Result<Report> {
        let mut run = Run::new();
        run.advance(RunState::DocumentResolved);
        self.run(&mut run, document, keyword, locale)
    }

    pub fn analyze_html(
        &self,
        raw: &str,
        keyword: Option<&str>,
        locale: Option<&str>,
    ) -> Result<Report> {
        self.analyze_document(&Document::from_html(raw), keyword, locale)
    }

    /// Reads a local file. Invalid UTF-8 is replaced rather than rejected.
    pub fn analyze_file(
        &self,
        path: impl AsRef<Path>,
        keyword: Option<&str>,
        locale: Option<&str>,
    ) -> Result<Report> {
        let path = path.as_ref();
        let mut run = Run::new();
        tracing::info!("[ANALYZER] Analyzing file {}", path.display());
        let bytes = run.check(std::fs::read(path).map_err(|e| AnalyzerError::io(path, e)))?;
        let document = Document::from_html(String::from_utf8_lossy(&bytes));
        run.advance(RunState::DocumentResolved);
        self.run(&mut run, &document, keyword, locale)
    }

    pub async fn analyze_url(
        &self,
        url: &str,
        keyword: Option<&str>,
        locale: Option<&str>,
    ) -> Result<Report> {
        let mut run = Run::new();
        tracing::info!("[ANALYZER] Analyzing {}", url);
        let document = run.check(self.fetcher.fetch(url).await)?;
        run.advance(RunState::DocumentResolved);
        self.run(&mut run, &document, keyword, locale)
    }

    fn run(
        &self,
        run: &mut Run,
        document: &Document,
        keyword: Option<&str>,
        locale: Option<&str>,
    ) -> Result<Report> {
        let locale = locale
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.config.default_locale.as_str());
        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());
        tracing::debug!(
            "[ANALYZER] {} metrics, locale {}, keyword {:?}",
            self.registry.len(),
            locale,
            keyword
        );

        let parsed = document.parse();
        let mut report = Report::with_capacity(self.registry.len());
        for metric in self.registry.all() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                metric.evaluate(&parsed, keyword, locale, &self.catalog)
            }));
            let result = match outcome {
                Ok(result) => result,
                Err(payload) => Err(AnalyzerError::metric(
                    metric.name(),
                    panic_message(payload.as_ref()),
                )),
            };
            report.push(run.check(result)?);
        }
        run.advance(RunState::MetricsRun);

        tracing::debug!(
            "[ANALYZER] Report ready: {} results, worst impact {}",
            report.len(),
            report.worst_impact().as_str()
        );
        run.advance(RunState::Reported);
        Ok(report)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}

/// Assembles an [`Analyzer`]; every part left unset gets its default.
#[derive(Default)]
pub struct AnalyzerBuilder {
    config: Option<AnalyzerConfig>,
    registry: Option<MetricRegistry>,
    catalog: Option<Catalog>,
    transport: Option<Arc<dyn Transport>>,
    cache: Option<Arc<dyn ResponseCache>>,
    document: Option<Document>,
}

impl AnalyzerBuilder {
    pub fn config(mut self, config: AnalyzerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn registry(mut self, registry: MetricRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replaces the built-in translations. The catalog keeps its own fallback
    /// locale; `AnalyzerConfig::fallback_locale` only applies to the built-in one.
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn document(mut self, document: Document) -> Self {
        self.document = Some(document);
        self
    }

    pub fn build(self) -> Result<Analyzer> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => Catalog::builtin()?.with_fallback(&config.fallback_locale),
        };
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&config.fetch)?),
        };
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(MemoryCache::new(config.cache_ttl())));
        let registry = self.registry.unwrap_or_default();

        tracing::debug!(
            "[ANALYZER] Built with {} metrics, locales {:?}",
            registry.len(),
            catalog.locales()
        );
        Ok(Analyzer {
            registry,
            catalog: Arc::new(catalog),
            fetcher: PageFetcher::new(transport, cache, config.fetch.clone()),
            config,
            document: self.document,
        })
    }
}
