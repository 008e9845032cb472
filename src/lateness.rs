//! Lateness Engine
//!
//! Brackets when a report actually became visible using only the scan
//! ledger. The first scan that saw the report gives the upper bound; the
//! latest earlier scan taken after the nominal publication time (which did
//! not see it) gives the lower bound.
//!
//! Bounds are written once. A report with an upper bound is never
//! revisited, even if the ledger later gains a tighter scan.

use crate::ledger::ScanLedger;
use crate::model::Report;
use chrono::{NaiveDateTime, TimeDelta};
use tracing::debug;

/// Lower and upper bound on how late a report was
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bracket {
    pub min: Option<TimeDelta>,
    pub max: TimeDelta,
}

/// One report whose bounds were written during a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatenessUpdate {
    pub publication_id: String,
    pub bracket: Bracket,
}

/// Bracket one report's availability. `None` when no scan has seen it yet.
pub fn bracket(published_at: NaiveDateTime, identifier: &str, ledger: &ScanLedger) -> Option<Bracket> {
    let scans = ledger.chronological();
    let first_seen = scans.iter().find(|e| e.contains(identifier))?;

    let not_yet_visible = scans
        .iter()
        .filter(|e| e.at > published_at && e.at < first_seen.at)
        .map(|e| e.at)
        .max();

    Some(Bracket {
        min: not_yet_visible.map(|at| at - published_at),
        max: first_seen.at - published_at,
    })
}

/// Fill in lateness bounds for every report that lacks an upper bound.
pub fn compute_lateness(reports: &mut [Report], ledger: &ScanLedger) -> Vec<LatenessUpdate> {
    let mut updates = Vec::new();

    for report in reports.iter_mut() {
        if report.has_lateness() {
            continue;
        }
        let Some(found) = bracket(report.published_at(), &report.publication_id, ledger) else {
            debug!(publication_id = %report.publication_id, "no scan has seen report yet");
            continue;
        };

        report.late_by_max = Some(format_delta(found.max));
        report.late_by_min = found.min.map(format_delta);
        updates.push(LatenessUpdate {
            publication_id: report.publication_id.clone(),
            bracket: found,
        });
    }

    updates
}

/// Render a duration as `H:MM:SS`, prefixed with `N day(s), ` when it spans
/// whole days. Negative spans borrow a whole day, so -10 minutes is
/// `-1 day, 23:50:00`. This is the form existing tables already hold.
pub fn format_delta(delta: TimeDelta) -> String {
    const DAY: i64 = 86_400;
    let micros = delta.num_microseconds().unwrap_or(0);
    let total_secs = micros.div_euclid(1_000_000);
    let frac = micros.rem_euclid(1_000_000);

    let days = total_secs.div_euclid(DAY);
    let rem = total_secs.rem_euclid(DAY);
    let clock = format!("{}:{:02}:{:02}", rem / 3600, (rem % 3600) / 60, rem % 60);
    let clock = if frac == 0 { clock } else { format!("{}.{:06}", clock, frac) };

    match days {
        0 => clock,
        1 | -1 => format!("{} day, {}", days, clock),
        _ => format!("{} days, {}", days, clock),
    }
}
