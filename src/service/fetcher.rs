//! Page fetching: URL validation, caching and single-flight in front of a
//! [`Transport`].

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

use super::cache::{cache_key, ResponseCache};
use super::http::Transport;
use crate::config::FetchOptions;
use crate::domain::Document;
use crate::error::{AnalyzerError, HttpError, Result};

pub struct PageFetcher {
    transport: Arc<dyn Transport>,
    cache: Arc<dyn ResponseCache>,
    options: FetchOptions,
    /// One lock per cache key so concurrent fetches of a page hit the network once
    inflight: DashMap<String, Arc<Mutex<()>>>,
}

impl PageFetcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: Arc<dyn ResponseCache>,
        options: FetchOptions,
    ) -> Self {
        Self {
            transport,
            cache,
            options,
            inflight: DashMap::new(),
        }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    pub fn cache(&self) -> &Arc<dyn ResponseCache> {
        &self.cache
    }

    pub async fn fetch(&self, url: &str) -> Result<Document> {
        let parsed = parse_url(url).map_err(|e| AnalyzerError::fetch(url, e))?;
        let key = cache_key(&parsed);

        let lock = self.inflight.entry(key.clone()).or_default().clone();
        let result = {
            let _guard = lock.lock().await;
            self.fetch_locked(url, &parsed, &key).await
        };
        self.release(&key, lock);
        result
    }

    /// Drops the key's lock once no other fetch holds or waits on it.
    fn release(&self, key: &str, lock: Arc<Mutex<()>>) {
        // map entry plus `lock`; waiters clone under the same shard lock
        self.inflight.remove_if(key, |_, current| {
            Arc::ptr_eq(current, &lock) && Arc::strong_count(current) == 2
        });
    }

    async fn fetch_locked(&self, url: &str, parsed: &Url, key: &str) -> Result<Document> {
        if let Some(hit) = self.cache.get(key) {
            tracing::debug!("[CACHE] Hit: {}", key);
            return Ok(hit.into_document());
        }

        tracing::info!("[FETCH] Fetching {}", parsed);
        let response = self
            .transport
            .fetch(parsed, &self.options)
            .await
            .map_err(|e| {
                tracing::warn!("[FETCH] {} failed ({}): {}", url, e.kind(), e);
                AnalyzerError::fetch(url, e)
            })?;
        tracing::debug!(
            "[FETCH] {} -> {} ({} bytes, {} redirects, {:.0}ms)",
            url,
            response.status_code,
            response.body.len(),
            response.redirect_count,
            response.load_time_ms
        );

        self.cache.set(key, response.clone());
        Ok(response.into_document())
    }
}

/// Accepts absolute http(s) URLs with a host only.
fn parse_url(url: &str) -> std::result::Result<Url, HttpError> {
    let parsed = Url::parse(url.trim()).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(HttpError::InvalidUrl(format!("unsupported scheme `{}`", parsed.scheme())));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(HttpError::InvalidUrl("missing host".into()));
    }
    Ok(parsed)
}
