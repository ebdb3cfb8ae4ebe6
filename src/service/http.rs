use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use url::Url;

use crate::config::FetchOptions;
use crate::domain::{Document, FetchInfo};
use crate::error::{HttpError, Result};

/// What a transport hands back for one fetch, redirects already followed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResponse {
    pub body: String,
    pub final_url: String,
    pub status_code: u16,
    pub redirect_count: u32,
    /// Header names lowercased
    pub headers: BTreeMap<String, String>,
    pub load_time_ms: f64,
}

impl RawResponse {
    pub fn into_document(self) -> Document {
        let fetch = FetchInfo {
            final_url: self.final_url,
            status_code: self.status_code,
            redirect_count: self.redirect_count,
            headers: self.headers,
            load_time_ms: self.load_time_ms,
        };
        Document::from_response(self.body, fetch)
    }
}

/// Pluggable network access. Tests swap in a canned implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(
        &self,
        url: &Url,
        options: &FetchOptions,
    ) -> std::result::Result<RawResponse, HttpError>;
}

/// Factory for the reqwest client used by [`ReqwestTransport`].
///
/// Redirects are disabled at the client level so the transport can count hops.
pub fn create_client(options: &FetchOptions) -> anyhow::Result<Client> {
    Client::builder()
        .user_agent(options.user_agent.as_str())
        .redirect(Policy::none())
        .timeout(options.timeout())
        .build()
        .context("Failed to build reqwest client")
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(options: &FetchOptions) -> Result<Self> {
        Ok(Self {
            client: create_client(options)?,
        })
    }

    async fn follow(
        &self,
        start: &Url,
        options: &FetchOptions,
    ) -> std::result::Result<RawResponse, HttpError> {
        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                HttpError::Timeout(options.timeout())
            } else {
                HttpError::connection(e.to_string())
            }
        };

        let mut url = start.clone();
        let mut redirects: u32 = 0;
        loop {
            tracing::trace!("[FETCH] GET {}", url);
            let response = self.client.get(url.clone()).send().await.map_err(classify)?;
            let status = response.status();

            if status.is_redirection() && options.follow_redirects {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or(HttpError::Status(status.as_u16()))?;
                if redirects as usize >= options.max_redirects {
                    return Err(HttpError::TooManyRedirects(options.max_redirects));
                }
                let next = url
                    .join(location)
                    .map_err(|e| {
                        HttpError::InvalidUrl(format!("redirect to `{location}`: {e}"))
                    })?;
                tracing::debug!("[FETCH] {} redirected ({}) to {}", url, status.as_u16(), next);
                url = next;
                redirects += 1;
                continue;
            }

            if !status.is_success() {
                return Err(HttpError::Status(status.as_u16()));
            }

            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
                })
                .collect();
            let body = response.text().await.map_err(classify)?;

            return Ok(RawResponse {
                body,
                final_url: url.to_string(),
                status_code: status.as_u16(),
                redirect_count: redirects,
                headers,
                load_time_ms: 0.0,
            });
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(
        &self,
        url: &Url,
        options: &FetchOptions,
    ) -> std::result::Result<RawResponse, HttpError> {
        let started = Instant::now();
        let mut response = tokio::time::timeout(options.timeout(), self.follow(url, options))
            .await
            .map_err(|_| HttpError::Timeout(options.timeout()))??;
        response.load_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        Ok(response)
    }
}
