//! Report records

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// The house a committee belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum House {
    Commons,
    Lords,
    Joint,
}

impl House {
    /// Parse the feed's house label. Unknown labels yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "Commons" => Some(Self::Commons),
            "Lords" => Some(Self::Lords),
            "Joint" => Some(Self::Joint),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commons => "Commons",
            Self::Lords => "Lords",
            Self::Joint => "Joint",
        }
    }
}

impl std::fmt::Display for House {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committee report as recorded in the Reports table.
///
/// Field order is the column order of the persisted table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    #[serde(rename = "Publication ID")]
    pub publication_id: String,
    #[serde(rename = "HC Number", default)]
    pub hc_number: String,
    #[serde(rename = "Session", default)]
    pub session: String,
    #[serde(rename = "Committee Name", default)]
    pub committee_name: String,
    #[serde(rename = "House")]
    pub house: House,
    #[serde(rename = "Report Title", default)]
    pub title: String,
    #[serde(rename = "Report Ordinal", default)]
    pub ordinal: String,
    #[serde(rename = "Publication Date")]
    pub publication_date: NaiveDate,
    #[serde(rename = "Publication Time")]
    pub publication_time: NaiveTime,
    /// Lower bound on lateness; empty when no scan pins it down
    #[serde(rename = "Late by min", default)]
    pub late_by_min: Option<String>,
    /// Upper bound on lateness; once set the report is never revisited
    #[serde(rename = "Late by max", default)]
    pub late_by_max: Option<String>,
}

impl Report {
    /// Nominal publication timestamp
    pub fn published_at(&self) -> NaiveDateTime {
        self.publication_date.and_time(self.publication_time)
    }

    /// True once the upper lateness bound has been written.
    pub fn has_lateness(&self) -> bool {
        self.late_by_max
            .as_deref()
            .is_some_and(|v| !v.trim().is_empty())
    }
}
