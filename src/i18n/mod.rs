//! Localization store for metric messages.
//!
//! Templates are looked up by `(locale, key)` and resolved through a fixed
//! chain: the exact locale, then its language alone (`pl_PL` -> `pl`), then
//! the fallback locale. A key missing from all three is an error; a wrong
//! language is never substituted silently.
//!
//! Templates use `{name}` placeholders. A placeholder without a matching
//! parameter is left as is.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::{AnalyzerError, Result};

/// Locale used when nothing else matches.
pub const DEFAULT_FALLBACK_LOCALE: &str = "en";

const BUILTIN_CATALOGS: [(&str, &str); 2] = [
    ("en", include_str!("locales/en.json")),
    ("pl", include_str!("locales/pl.json")),
];

/// Named parameters for a template.
pub type Params<'a> = [(&'a str, String)];

#[derive(Debug, Clone)]
pub struct Catalog {
    templates: HashMap<String, HashMap<String, String>>,
    fallback_locale: String,
}

impl Catalog {
    /// A catalog with no templates.
    pub fn empty(fallback_locale: &str) -> Self {
        Self {
            templates: HashMap::new(),
            fallback_locale: normalize_locale(fallback_locale),
        }
    }

    /// English and Polish catalogs shipped with the crate, falling back to English.
    pub fn builtin() -> Result<Self> {
        let mut catalog = Self::empty(DEFAULT_FALLBACK_LOCALE);
        for (locale, json) in BUILTIN_CATALOGS {
            catalog.load_json(locale, json)?;
        }
        Ok(catalog)
    }

    pub fn with_fallback(mut self, fallback_locale: &str) -> Self {
        self.fallback_locale = normalize_locale(fallback_locale);
        self
    }

    pub fn fallback_locale(&self) -> &str {
        &self.fallback_locale
    }

    /// Merge a flat `key -> template` JSON object into `locale`.
    pub fn load_json(&mut self, locale: &str, json: &str) -> Result<()> {
        let entries: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| AnalyzerError::Catalog(format!("locale {locale}: {e}")))?;
        self.templates
            .entry(normalize_locale(locale))
            .or_default()
            .extend(entries);
        Ok(())
    }

    pub fn insert(&mut self, locale: &str, key: impl Into<String>, template: impl Into<String>) {
        self.templates
            .entry(normalize_locale(locale))
            .or_default()
            .insert(key.into(), template.into());
    }

    /// Locales with at least one template, sorted.
    pub fn locales(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        locales.sort_unstable();
        locales
    }

    /// Whether `key` resolves for `locale` anywhere along the fallback chain.
    pub fn contains(&self, locale: &str, key: &str) -> bool {
        self.resolve(locale, key).is_some()
    }

    /// Render `key` for `locale`, substituting `params`.
    pub fn render(&self, locale: &str, key: &str, params: &Params<'_>) -> Result<String> {
        let template = self
            .resolve(locale, key)
            .ok_or_else(|| AnalyzerError::missing_translation(locale, key))?;
        Ok(interpolate(template, params))
    }

    fn resolve(&self, locale: &str, key: &str) -> Option<&str> {
        let locale = normalize_locale(locale);
        let language = language_of(&locale);

        let found = self.lookup(&locale, key).or_else(|| self.lookup(language, key));
        if found.is_some() {
            return found;
        }

        let fallback = self.lookup(&self.fallback_locale, key);
        if fallback.is_some() {
            tracing::debug!(
                "[I18N] No `{}` template for {}, using fallback {}",
                key,
                locale,
                self.fallback_locale
            );
        }
        fallback
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&str> {
        self.templates
            .get(locale)
            .and_then(|t| t.get(key))
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }
}

/// `pl-pl.UTF-8` -> `pl_PL`.
pub fn normalize_locale(locale: &str) -> String {
    let locale = locale
        .trim()
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .replace('-', "_");
    match locale.split_once('_') {
        Some((language, region)) => {
            format!("{}_{}", language.to_ascii_lowercase(), region.to_ascii_uppercase())
        }
        None => locale.to_ascii_lowercase(),
    }
}

fn language_of(locale: &str) -> &str {
    locale.split('_').next().unwrap_or(locale)
}

fn interpolate(template: &str, params: &Params<'_>) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let placeholder =
        PLACEHOLDER.get_or_init(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").unwrap());

    placeholder
        .replace_all(template, |caps: &Captures<'_>| {
            params
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.clone())
        })
        .into_owned()
}
