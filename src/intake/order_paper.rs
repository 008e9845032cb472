//! Order Paper Intake

use super::document::{OrderPaperDocument, SectionLayout};
use crate::extract::{extract_date_time, YearPolicy};
use crate::model::{OrderPaperEntry, OrderPaperKey};
use chrono::NaiveTime;
use std::collections::HashSet;
use tracing::debug;

/// Keys of every entry already in the Order Papers table
pub fn existing_keys(entries: &[OrderPaperEntry]) -> HashSet<OrderPaperKey> {
    entries.iter().map(OrderPaperEntry::key).collect()
}

/// Turns a parsed Order Paper section into new entries.
#[derive(Debug, Clone)]
pub struct OrderPaperIntake {
    /// Stand-in time for table rows whose cell has no time
    pub unknown_time: NaiveTime,
}

impl Default for OrderPaperIntake {
    fn default() -> Self {
        Self {
            unknown_time: NaiveTime::from_hms_opt(0, 1, 0).unwrap_or_default(),
        }
    }
}

impl OrderPaperIntake {
    /// New entries from `document`, skipping any whose key is already known.
    ///
    /// Dates are read relative to the document's business date. Heading
    /// sections keep the business date's year and leave a missing time
    /// empty; table sections roll past dates into the next year and fill a
    /// missing time with `unknown_time`.
    pub fn run(&self, document: &OrderPaperDocument, existing: &HashSet<OrderPaperKey>) -> Vec<OrderPaperEntry> {
        let anchor = document.business_date;
        let policy = match document.layout {
            SectionLayout::Headings => YearPolicy::AnchorYear,
            SectionLayout::Table => YearPolicy::RollForward,
        };

        let mut emitted: HashSet<OrderPaperKey> = HashSet::new();
        let mut entries = Vec::new();

        for row in &document.rows {
            let extracted = extract_date_time(&row.when, anchor, policy);
            let publication_time = match (extracted.time, document.layout) {
                (Some(time), _) => Some(time),
                (None, SectionLayout::Table) => Some(self.unknown_time),
                (None, SectionLayout::Headings) => None,
            };

            let entry = OrderPaperEntry {
                order_paper_date: anchor,
                committee_name: row.committee.clone(),
                description: row.description.clone(),
                hc_number: row.hc_number.clone(),
                publication_date: extracted.date_or(anchor),
                publication_time,
                status: None,
            };

            let key = entry.key();
            if existing.contains(&key) || !emitted.insert(key) {
                debug!(hc_number = %entry.hc_number, date = %anchor, "order paper entry already recorded");
                continue;
            }
            entries.push(entry);
        }

        entries
    }
}
