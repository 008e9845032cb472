//! Upstream collaborators
//!
//! The pipeline only sees the [`Upstream`] trait. [`HttpUpstream`] talks to
//! the live parliament APIs; tests substitute an in-memory double.

mod http;
mod payload;

pub use http::{HttpUpstream, RetryPolicy};
pub use payload::{decode_document_payload, scan_documents_page, DocumentPage, DocumentSummary, PageVerdict};

use crate::intake::PublicationItem;
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("gave up on {url} after {attempts} attempts: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: String,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed document payload: {0}")]
    Payload(String),
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// The sources a run reads from
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Current page of the publications feed
    async fn fetch_publications(&self) -> UpstreamResult<Vec<PublicationItem>>;

    /// Identifier of the Order Paper for `date`, if one has been issued
    async fn find_order_paper(&self, date: NaiveDate) -> UpstreamResult<Option<String>>;

    /// HTML of the business document `id`
    async fn fetch_document_html(&self, id: &str) -> UpstreamResult<String>;
}
