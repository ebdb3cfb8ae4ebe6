//! Analyzer configuration.
//!
//! Everything has a default; a config can also be read from JSON or from
//! `SEO_ANALYZER_*` environment variables.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AnalyzerError, Result};
use crate::i18n::DEFAULT_FALLBACK_LOCALE;

pub const DEFAULT_LOCALE: &str = "en_US";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; SeoAnalyzerBot/0.1; +https://github.com/seo-analyzer)";

const ENV_LOCALE: &str = "SEO_ANALYZER_LOCALE";
const ENV_TIMEOUT: &str = "SEO_ANALYZER_TIMEOUT_SECS";
const ENV_USER_AGENT: &str = "SEO_ANALYZER_USER_AGENT";

/// Options handed to the transport on every fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Budget for the whole redirect chain, body included
    pub timeout_secs: u64,
    pub follow_redirects: bool,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl FetchOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            follow_redirects: true,
            max_redirects: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Locale used when a call does not name one
    pub default_locale: String,
    /// Last stop of the translation fallback chain
    pub fallback_locale: String,
    pub fetch: FetchOptions,
    /// Lifetime of cached responses; `None` keeps them until cleared
    pub cache_ttl_secs: Option<u64>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            fallback_locale: DEFAULT_FALLBACK_LOCALE.to_string(),
            fetch: FetchOptions::default(),
            cache_ttl_secs: None,
        }
    }
}

impl AnalyzerConfig {
    /// Parses a JSON object. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| AnalyzerError::Config(e.to_string()))?;
        // serde also accepts a struct as a positional array
        if !value.is_object() {
            return Err(AnalyzerError::Config("config must be a JSON object".into()));
        }
        let config: Self =
            serde_json::from_value(value).map_err(|e| AnalyzerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by whatever `SEO_ANALYZER_*` variables are set.
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(locale) = var(ENV_LOCALE) {
            self.default_locale = locale;
        }
        if let Some(timeout) = var(ENV_TIMEOUT) {
            self.fetch.timeout_secs = timeout.trim().parse().map_err(|_| {
                AnalyzerError::Config(format!(
                    "{ENV_TIMEOUT} must be a number of seconds, got `{timeout}`"
                ))
            })?;
        }
        if let Some(user_agent) = var(ENV_USER_AGENT) {
            self.fetch.user_agent = user_agent;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch.timeout_secs == 0 {
            return Err(AnalyzerError::Config("fetch timeout must be at least one second".into()));
        }
        if self.default_locale.trim().is_empty() || self.fallback_locale.trim().is_empty() {
            return Err(AnalyzerError::Config("locales must not be empty".into()));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.default_locale, "en_US");
        assert_eq!(config.fallback_locale, "en");
        assert_eq!(config.fetch.timeout(), Duration::from_secs(30));
        assert!(config.fetch.follow_redirects);
        assert_eq!(config.cache_ttl(), None);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AnalyzerConfig::from_json(
            r#"{"default_locale": "pl_PL", "fetch": {"timeout_secs": 5}, "cache_ttl_secs": 60}"#,
        )
        .unwrap();
        assert_eq!(config.default_locale, "pl_PL");
        assert_eq!(config.fetch.timeout_secs, 5);
        assert_eq!(config.fetch.max_redirects, 10);
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = AnalyzerConfig::from_json(r#"{"fetch": {"timeout_secs": 0}}"#).unwrap_err();
        assert!(matches!(err, AnalyzerError::Config(_)));
        assert!(AnalyzerConfig::from_json("[]").is_err());
    }

    #[test]
    fn test_non_object_json_is_rejected() {
        for json in ["[]", r#"["pl_PL", "en"]"#, "null", "30", r#""en_US""#] {
            let err = AnalyzerConfig::from_json(json).unwrap_err();
            assert!(
                matches!(&err, AnalyzerError::Config(msg) if msg.contains("JSON object")),
                "{json}: {err}"
            );
        }
        assert_eq!(AnalyzerConfig::from_json("{}").unwrap(), AnalyzerConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_LOCALE, "pl_PL"),
            (ENV_TIMEOUT, " 12 "),
            (ENV_USER_AGENT, "test-agent"),
        ]);
        let config = AnalyzerConfig::default()
            .with_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.default_locale, "pl_PL");
        assert_eq!(config.fetch.timeout_secs, 12);
        assert_eq!(config.fetch.user_agent, "test-agent");

        let err = AnalyzerConfig::default()
            .with_overrides(|name| (name == ENV_TIMEOUT).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_TIMEOUT));
    }
}
