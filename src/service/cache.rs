//! Response cache keyed by normalized URL.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;
use url::{form_urlencoded, Url};

use super::http::RawResponse;

pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &str) -> Option<RawResponse>;
    fn set(&self, key: &str, response: RawResponse);
    fn clear(&self);
}

/// Cache key for `url`: lowercase host, default port dropped, query pairs
/// sorted, fragment ignored.
pub fn cache_key(url: &Url) -> String {
    let mut key = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        key.push_str(&format!(":{port}"));
    }
    key.push_str(url.path());

    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    if !pairs.is_empty() {
        pairs.sort();
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        key.push('?');
        key.push_str(&query);
    }
    key
}

struct CacheEntry {
    response: RawResponse,
    stored_at: DateTime<Utc>,
}

/// In-process cache. Entries expire after `ttl` when one is set.
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Option<Duration>,
}

impl MemoryCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        let Some(ttl) = self.ttl else {
            return false;
        };
        (Utc::now() - entry.stored_at)
            .to_std()
            .is_ok_and(|age| age >= ttl)
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ResponseCache for MemoryCache {
    fn get(&self, key: &str) -> Option<RawResponse> {
        {
            let entry = self.entries.get(key)?;
            if !self.is_expired(&entry) {
                return Some(entry.response.clone());
            }
        }
        tracing::debug!("[CACHE] Entry expired: {}", key);
        self.entries.remove(key);
        None
    }

    fn set(&self, key: &str, response: RawResponse) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                response,
                stored_at: Utc::now(),
            },
        );
    }

    fn clear(&self) {
        self.entries.clear();
    }
}
