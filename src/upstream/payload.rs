//! Decoding of business-document payloads

use super::{UpstreamError, UpstreamResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

/// One page of the business-document listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DocumentPage {
    pub total_results: Option<usize>,
    pub results: Vec<DocumentSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DocumentSummary {
    pub id: Option<Value>,
    pub business_date: Option<String>,
    pub notes: Option<String>,
}

impl DocumentSummary {
    fn business_day(&self) -> Option<NaiveDate> {
        let raw = self.business_date.as_deref()?.trim();
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    fn id_string(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }
}

/// Outcome of scanning one listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageVerdict {
    Found(String),
    /// Listing has moved past the target date, or ran out
    NotFound,
    NextPage,
}

/// Look for the target document on one page.
///
/// The listing is newest first, so the first entry older than `target`
/// ends the search.
pub fn scan_documents_page(page: &DocumentPage, target: NaiveDate, note: &str) -> PageVerdict {
    if page.results.is_empty() {
        return PageVerdict::NotFound;
    }
    for summary in &page.results {
        let Some(day) = summary.business_day() else {
            continue;
        };
        if day < target {
            return PageVerdict::NotFound;
        }
        if day == target && summary.notes.as_deref().unwrap_or("") == note {
            return match summary.id_string() {
                Some(id) => PageVerdict::Found(id),
                None => PageVerdict::NotFound,
            };
        }
    }
    PageVerdict::NextPage
}

const HTML_KEYS: [&str; 6] = ["html", "Html", "content", "Content", "data", "Data"];

/// Turn a document response body into HTML text.
///
/// The body is Base64, optionally wrapped in a JSON object under one of a
/// few known keys. Whitespace in the Base64 is ignored.
pub fn decode_document_payload(body: &[u8]) -> UpstreamResult<String> {
    let trimmed = String::from_utf8_lossy(body);
    let trimmed = trimmed.trim();

    let encoded = if trimmed.starts_with('{') && trimmed.ends_with('}') {
        let value: Value = serde_json::from_str(trimmed)?;
        HTML_KEYS
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .ok_or_else(|| UpstreamError::Payload("JSON response has no HTML field".into()))?
    } else {
        trimmed.trim_matches('"').to_string()
    };

    let compact: String = encoded.split_whitespace().collect();
    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| UpstreamError::Payload(format!("invalid Base64: {}", e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
