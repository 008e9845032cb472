//! Live HTTP upstream with bounded retry

use super::payload::{decode_document_payload, scan_documents_page, DocumentPage, PageVerdict};
use super::{Upstream, UpstreamError, UpstreamResult};
use crate::config::{Config, HttpSettings};
use crate::intake::{PublicationFeed, PublicationItem};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, ACCEPT, RETRY_AFTER};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const JSON_ACCEPT: &str = "application/json";
const DOCUMENT_ACCEPT: &str = "text/plain, application/octet-stream, application/json;q=0.9, */*;q=0.1";

/// Retry schedule for transient failures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff_secs: f64,
}

impl RetryPolicy {
    pub fn from_settings(settings: &HttpSettings) -> Self {
        Self {
            attempts: settings.retry_attempts.max(1),
            backoff_secs: settings.retry_backoff_secs.max(0.0),
        }
    }

    /// Statuses worth another attempt
    pub fn is_transient(status: u16) -> bool {
        matches!(status, 429 | 500 | 502 | 503 | 504)
    }

    /// Delay before the attempt after `attempt` (1-based). A server
    /// `Retry-After` in seconds takes precedence over linear backoff.
    pub fn delay(&self, attempt: u32, retry_after: Option<&str>) -> Duration {
        retry_after
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64)
            .unwrap_or_else(|| Duration::from_secs_f64(self.backoff_secs * f64::from(attempt)))
    }
}

/// Upstream backed by the parliament committees and house papers APIs
pub struct HttpUpstream {
    client: Client,
    retry: RetryPolicy,
    publications_url: String,
    config: Config,
}

impl HttpUpstream {
    pub fn new(config: &Config) -> UpstreamResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .user_agent(config.http.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            retry: RetryPolicy::from_settings(&config.http),
            publications_url: config.publications_url.clone(),
            config: config.clone(),
        })
    }

    async fn get_bytes(&self, url: &str, accept: &str) -> UpstreamResult<Vec<u8>> {
        let mut last = String::new();

        for attempt in 1..=self.retry.attempts {
            let response = match self.client.get(url).header(ACCEPT, accept).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(url, attempt, error = %e, "request failed");
                    last = e.to_string();
                    self.pause(attempt, None).await;
                    continue;
                }
            };

            let status = response.status();
            if RetryPolicy::is_transient(status.as_u16()) {
                let hint = retry_after(response.headers());
                warn!(url, attempt, status = status.as_u16(), "transient status");
                last = format!("status {}", status.as_u16());
                self.pause(attempt, hint.as_deref()).await;
                continue;
            }
            if !status.is_success() {
                return Err(UpstreamError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            match response.bytes().await {
                Ok(body) => return Ok(body.to_vec()),
                Err(e) => {
                    warn!(url, attempt, error = %e, "body read failed");
                    last = e.to_string();
                    self.pause(attempt, None).await;
                }
            }
        }

        Err(UpstreamError::RetriesExhausted {
            url: url.to_string(),
            attempts: self.retry.attempts,
            last,
        })
    }

    async fn pause(&self, attempt: u32, retry_after: Option<&str>) {
        if attempt < self.retry.attempts {
            tokio::time::sleep(self.retry.delay(attempt, retry_after)).await;
        }
    }
}

fn retry_after(headers: &HeaderMap) -> Option<String> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn fetch_publications(&self) -> UpstreamResult<Vec<PublicationItem>> {
        let body = self.get_bytes(&self.publications_url, JSON_ACCEPT).await?;
        let feed: PublicationFeed = serde_json::from_slice(&body)?;
        debug!(items = feed.items.len(), "fetched publications feed");
        Ok(feed.items)
    }

    async fn find_order_paper(&self, date: NaiveDate) -> UpstreamResult<Option<String>> {
        let page_size = self.config.http.page_size.max(1);
        let mut skip = 0;

        for _ in 0..self.config.http.max_pages {
            let url = self.config.documents_page_url(skip);
            let body = self.get_bytes(&url, JSON_ACCEPT).await?;
            let page: DocumentPage = serde_json::from_slice(&body)?;

            match scan_documents_page(&page, date, &self.config.business_note) {
                PageVerdict::Found(id) => return Ok(Some(id)),
                PageVerdict::NotFound => return Ok(None),
                PageVerdict::NextPage => {}
            }

            skip += page_size;
            if page.total_results.is_some_and(|total| skip >= total) {
                return Ok(None);
            }
        }
        Ok(None)
    }

    async fn fetch_document_html(&self, id: &str) -> UpstreamResult<String> {
        let url = self.config.document_url(id);
        let body = self.get_bytes(&url, DOCUMENT_ACCEPT).await?;
        decode_document_payload(&body)
    }
}
