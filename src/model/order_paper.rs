//! Order Paper entries

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an Order Paper entry.
///
/// An empty cell is represented as `None` on the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderPaperStatus {
    Due,
    Missing,
    Published,
    #[serde(rename = "OP Error")]
    OpError,
}

impl OrderPaperStatus {
    /// Terminal statuses are never overwritten.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Published | Self::OpError)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Due => "Due",
            Self::Missing => "Missing",
            Self::Published => "Published",
            Self::OpError => "OP Error",
        }
    }
}

impl std::fmt::Display for OrderPaperStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deduplication key: the Order Paper's business date plus the normalised
/// HC number, or the committee and description when no HC number is given.
///
/// The same HC number listed on two different days yields two entries.
pub type OrderPaperKey = (NaiveDate, String);

/// One expected publication from the "Committee Reports Published Today"
/// section of an Order Paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaperEntry {
    #[serde(rename = "Order Paper date")]
    pub order_paper_date: NaiveDate,
    #[serde(rename = "Committee name", default)]
    pub committee_name: String,
    #[serde(rename = "Report description", default)]
    pub description: String,
    #[serde(rename = "HC Number", default)]
    pub hc_number: String,
    #[serde(rename = "Publication date")]
    pub publication_date: NaiveDate,
    #[serde(rename = "Publication time", default)]
    pub publication_time: Option<NaiveTime>,
    #[serde(rename = "HC matched", default)]
    pub status: Option<OrderPaperStatus>,
}

impl OrderPaperEntry {
    pub fn key(&self) -> OrderPaperKey {
        let hc = normalize_hc_number(&self.hc_number);
        if hc.is_empty() {
            let committee = self.committee_name.trim();
            let description = self.description.trim();
            return (self.order_paper_date, format!("{} / {}", committee, description));
        }
        (self.order_paper_date, hc)
    }

    /// Expected publication timestamp, when the time is known
    pub fn expected_at(&self) -> Option<NaiveDateTime> {
        self.publication_time
            .map(|time| self.publication_date.and_time(time))
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_some_and(|s| s.is_terminal())
    }
}

/// Canonical form of an HC number for matching across sources.
///
/// Collapses whitespace, upper-cases, and strips a leading `HC` token, so
/// `"HC 123"`, `"hc  123"` and `"123"` compare equal.
pub fn normalize_hc_number(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
    match collapsed.strip_prefix("HC") {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest.trim().to_string(),
        _ => collapsed,
    }
}
