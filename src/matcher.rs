//! Order Paper Matcher
//!
//! Assigns each Order Paper entry a status by looking its HC number up in
//! the Reports table and comparing its expected time with the clock.
//! `Published` and `OP Error` are terminal and never overwritten.

use crate::model::{normalize_hc_number, OrderPaperEntry, OrderPaperKey, OrderPaperStatus, Report};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use tracing::debug;

/// A status written during a matching pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub key: OrderPaperKey,
    pub from: Option<OrderPaperStatus>,
    pub to: OrderPaperStatus,
}

/// Index of normalised HC numbers present in the Reports table
pub fn hc_index(reports: &[Report]) -> HashSet<String> {
    reports
        .iter()
        .map(|r| normalize_hc_number(&r.hc_number))
        .filter(|hc| !hc.is_empty())
        .collect()
}

/// Next status for one entry, or `None` to leave it alone.
pub fn next_status(
    entry: &OrderPaperEntry,
    published: &HashSet<String>,
    now: NaiveDateTime,
) -> Option<OrderPaperStatus> {
    if entry.is_terminal() {
        return None;
    }
    let hc = normalize_hc_number(&entry.hc_number);
    if hc.is_empty() {
        return None;
    }
    if published.contains(&hc) {
        return Some(OrderPaperStatus::Published);
    }

    let expected = entry.expected_at()?;
    let candidate = if expected < now {
        OrderPaperStatus::Missing
    } else {
        OrderPaperStatus::Due
    };

    // An overdue entry does not drift back to Due
    match (entry.status, candidate) {
        (Some(OrderPaperStatus::Missing), OrderPaperStatus::Due) => None,
        _ => Some(candidate),
    }
}

/// Run one matching pass over every entry, returning what changed.
pub fn match_order_papers(
    entries: &mut [OrderPaperEntry],
    reports: &[Report],
    now: NaiveDateTime,
) -> Vec<StatusChange> {
    let published = hc_index(reports);
    let mut changes = Vec::new();

    for entry in entries.iter_mut() {
        let Some(next) = next_status(entry, &published, now) else {
            continue;
        };
        if entry.status == Some(next) {
            continue;
        }
        debug!(
            hc_number = %entry.hc_number,
            from = ?entry.status,
            to = %next,
            "order paper status change"
        );
        changes.push(StatusChange {
            key: entry.key(),
            from: entry.status,
            to: next,
        });
        entry.status = Some(next);
    }

    changes
}
