//! Scan Ledger: append-only history of feed polls
//!
//! Each event carries only the identifiers first observed in that poll. An
//! identifier therefore appears in at most one event, which is what lets the
//! lateness engine read "first seen" straight off the ledger.

use crate::model::ScanEvent;
use chrono::NaiveDateTime;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct ScanLedger {
    events: Vec<ScanEvent>,
    seen: HashSet<String>,
}

impl ScanLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted events, in persisted order.
    pub fn from_events(events: Vec<ScanEvent>) -> Self {
        let seen = events
            .iter()
            .flat_map(|e| e.identifiers.iter().cloned())
            .collect();
        Self { events, seen }
    }

    /// Append one scan event.
    ///
    /// Identifiers already present in an earlier event, or repeated within
    /// `new_identifiers`, are dropped so the first-seen invariant holds no
    /// matter what the caller passes. An empty event is still recorded.
    pub fn record_scan(&mut self, at: NaiveDateTime, new_identifiers: Vec<String>) -> &ScanEvent {
        let mut fresh = Vec::with_capacity(new_identifiers.len());
        for id in new_identifiers {
            let id = id.trim().to_string();
            if id.is_empty() {
                continue;
            }
            if self.seen.insert(id.clone()) {
                fresh.push(id);
            }
        }
        self.events.push(ScanEvent::new(at, fresh));
        let last = self.events.len() - 1;
        &self.events[last]
    }

    /// Union of every event's identifiers
    pub fn all_seen_identifiers(&self) -> &HashSet<String> {
        &self.seen
    }

    pub fn has_seen(&self, identifier: &str) -> bool {
        self.seen.contains(identifier)
    }

    /// Events in persisted (append) order
    pub fn events(&self) -> &[ScanEvent] {
        &self.events
    }

    /// Events sorted by timestamp; ties keep append order.
    pub fn chronological(&self) -> Vec<&ScanEvent> {
        let mut sorted: Vec<&ScanEvent> = self.events.iter().collect();
        sorted.sort_by_key(|e| e.at);
        sorted
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<ScanEvent> {
        self.events
    }
}
