//! Publication Intake
//!
//! Every item's identifier is checked against the scan ledger first, before
//! any filtering: a Lords report or one with a broken timestamp has still
//! been *seen*. Items then pass through an ordered list of named predicates;
//! the first rejection wins and is reported with its reason.

use crate::extract::OrdinalGrammar;
use crate::ledger::ScanLedger;
use crate::model::{House, Report};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// Top-level publications payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PublicationFeed {
    pub items: Vec<PublicationItem>,
}

/// One item from the publications feed
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicationItem {
    #[serde(deserialize_with = "identifier_string")]
    pub id: String,
    pub committee: Option<CommitteeRef>,
    pub description: Option<String>,
    pub publication_start_date: Option<String>,
    pub hc_number: Option<HcNumberRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommitteeRef {
    pub name: Option<String>,
    pub house: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HcNumberRef {
    #[serde(deserialize_with = "identifier_string")]
    pub number: String,
    pub session_description: Option<String>,
}

/// Identifiers arrive as numbers or strings; store them as strings.
fn identifier_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

impl PublicationItem {
    pub fn house_label(&self) -> &str {
        self.committee
            .as_ref()
            .and_then(|c| c.house.as_deref())
            .unwrap_or("")
    }

    pub fn committee_name(&self) -> &str {
        self.committee
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .unwrap_or("")
    }

    pub fn published_at(&self) -> Option<NaiveDateTime> {
        self.publication_start_date
            .as_deref()
            .and_then(parse_publication_timestamp)
    }
}

/// Parse an ISO-8601-ish feed timestamp.
///
/// Accepts RFC 3339 (`Z` or an offset), a naive date-time, or a bare date
/// (midnight). The result is the wall-clock time in the timestamp's own
/// offset, truncated to whole seconds.
pub fn parse_publication_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok())
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").ok())
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    parsed.with_nanosecond(0)
}

/// Why an item did not become a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingIdentifier,
    AlreadyRecorded,
    ExcludedHouse(String),
    MissingTimestamp,
    UnparseableTimestamp(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingIdentifier => write!(f, "no identifier"),
            Self::AlreadyRecorded => write!(f, "already in reports table"),
            Self::ExcludedHouse(house) if house.is_empty() => write!(f, "no house"),
            Self::ExcludedHouse(house) => write!(f, "house {} not accepted", house),
            Self::MissingTimestamp => write!(f, "no publication timestamp"),
            Self::UnparseableTimestamp(raw) => write!(f, "unparseable timestamp {:?}", raw),
        }
    }
}

/// A skipped item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub publication_id: String,
    pub predicate: &'static str,
    pub reason: SkipReason,
}

/// State the predicates read
pub struct FilterContext<'a> {
    recorded: &'a HashSet<String>,
    houses: &'a [House],
}

/// A named accept/reject check
#[derive(Clone, Copy)]
pub struct Predicate {
    pub name: &'static str,
    check: fn(&PublicationItem, &FilterContext<'_>) -> Result<(), SkipReason>,
}

impl std::fmt::Debug for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predicate").field("name", &self.name).finish()
    }
}

fn has_identifier(item: &PublicationItem, _: &FilterContext<'_>) -> Result<(), SkipReason> {
    if item.id.is_empty() {
        return Err(SkipReason::MissingIdentifier);
    }
    Ok(())
}

fn not_recorded(item: &PublicationItem, ctx: &FilterContext<'_>) -> Result<(), SkipReason> {
    if ctx.recorded.contains(&item.id) {
        return Err(SkipReason::AlreadyRecorded);
    }
    Ok(())
}

fn accepted_house(item: &PublicationItem, ctx: &FilterContext<'_>) -> Result<(), SkipReason> {
    match House::parse(item.house_label()) {
        Some(house) if ctx.houses.contains(&house) => Ok(()),
        _ => Err(SkipReason::ExcludedHouse(item.house_label().to_string())),
    }
}

fn parseable_timestamp(item: &PublicationItem, _: &FilterContext<'_>) -> Result<(), SkipReason> {
    match item.publication_start_date.as_deref().map(str::trim) {
        None | Some("") => Err(SkipReason::MissingTimestamp),
        Some(raw) => match parse_publication_timestamp(raw) {
            Some(_) => Ok(()),
            None => Err(SkipReason::UnparseableTimestamp(raw.to_string())),
        },
    }
}

/// Filters applied to each item, in order
pub const PREDICATES: [Predicate; 4] = [
    Predicate { name: "has_identifier", check: has_identifier },
    Predicate { name: "not_recorded", check: not_recorded },
    Predicate { name: "accepted_house", check: accepted_house },
    Predicate { name: "parseable_timestamp", check: parseable_timestamp },
];

/// What one intake pass produced
#[derive(Debug, Clone, Default)]
pub struct IntakeOutcome {
    /// New Report rows, lateness unset
    pub new_reports: Vec<Report>,
    /// Identifiers never seen by any earlier scan, from the raw item stream
    pub new_identifiers: Vec<String>,
    pub rejections: Vec<Rejection>,
}

/// Publication Intake stage
#[derive(Debug, Clone)]
pub struct PublicationIntake {
    grammar: OrdinalGrammar,
    houses: Vec<House>,
}

impl PublicationIntake {
    pub fn new(grammar: OrdinalGrammar, houses: Vec<House>) -> Self {
        Self { grammar, houses }
    }

    pub fn predicates(&self) -> &'static [Predicate] {
        &PREDICATES
    }

    /// Run intake over one feed batch.
    pub fn run(&self, items: &[PublicationItem], ledger: &ScanLedger, reports: &[Report]) -> IntakeOutcome {
        let mut recorded: HashSet<String> = reports.iter().map(|r| r.publication_id.clone()).collect();
        let mut batch_seen: HashSet<&str> = HashSet::new();
        let mut outcome = IntakeOutcome::default();

        for item in items {
            if !item.id.is_empty() && !ledger.has_seen(&item.id) && batch_seen.insert(&item.id) {
                outcome.new_identifiers.push(item.id.clone());
            }

            let ctx = FilterContext {
                recorded: &recorded,
                houses: &self.houses,
            };
            let rejected = PREDICATES
                .iter()
                .find_map(|p| (p.check)(item, &ctx).err().map(|reason| (p.name, reason)));
            if let Some((predicate, reason)) = rejected {
                debug!(publication_id = %item.id, predicate, %reason, "skipping publication");
                outcome.rejections.push(Rejection {
                    publication_id: item.id.clone(),
                    predicate,
                    reason,
                });
                continue;
            }

            let Some(report) = self.to_report(item) else {
                continue;
            };
            recorded.insert(report.publication_id.clone());
            outcome.new_reports.push(report);
        }

        outcome
    }

    fn to_report(&self, item: &PublicationItem) -> Option<Report> {
        let published = item.published_at()?;
        let house = House::parse(item.house_label())?;
        let split = self.grammar.split(item.description.as_deref().unwrap_or(""));
        let (hc_number, session) = match &item.hc_number {
            Some(hc) => (hc.number.clone(), hc.session_description.clone().unwrap_or_default()),
            None => (String::new(), String::new()),
        };

        Some(Report {
            publication_id: item.id.clone(),
            hc_number,
            session,
            committee_name: item.committee_name().to_string(),
            house,
            title: split.title,
            ordinal: split.ordinal,
            publication_date: published.date(),
            publication_time: published.time(),
            late_by_min: None,
            late_by_max: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use serde_json::json;

    fn feed(value: serde_json::Value) -> Vec<PublicationItem> {
        serde_json::from_value::<PublicationFeed>(value).unwrap().items
    }

    fn item(id: u64, house: &str, start: &str) -> serde_json::Value {
        json!({
            "id": id,
            "committee": { "name": "Treasury Committee", "house": house },
            "description": "58th Report - Annual Review",
            "publicationStartDate": start,
            "hcNumber": { "number": "HC 123", "sessionDescription": "2024-25" }
        })
    }

    fn intake() -> PublicationIntake {
        PublicationIntake::new(OrdinalGrammar::default(), vec![House::Commons, House::Joint])
    }

    #[test]
    fn accepted_item_becomes_report() {
        let items = feed(json!({ "items": [item(101, "Commons", "2025-03-12T00:01:00Z")] }));
        let out = intake().run(&items, &ScanLedger::new(), &[]);

        assert_eq!(out.new_identifiers, vec!["101"]);
        assert_eq!(out.new_reports.len(), 1);
        let r = &out.new_reports[0];
        assert_eq!(r.publication_id, "101");
        assert_eq!(r.ordinal, "58th Report");
        assert_eq!(r.title, "Annual Review");
        assert_eq!(r.hc_number, "HC 123");
        assert_eq!(r.session, "2024-25");
        assert_eq!(r.house, House::Commons);
        assert_eq!(r.publication_time.to_string(), "00:01:00");
        assert_eq!(r.late_by_max, None);
    }

    #[test]
    fn lords_items_are_seen_but_not_recorded() {
        let items = feed(json!({ "items": [
            item(1, "Lords", "2025-03-12T00:01:00Z"),
            item(2, "Joint", "2025-03-12T00:01:00Z"),
        ] }));
        let out = intake().run(&items, &ScanLedger::new(), &[]);

        assert_eq!(out.new_identifiers, vec!["1", "2"]);
        assert_eq!(out.new_reports.len(), 1);
        assert_eq!(out.new_reports[0].house, House::Joint);
        assert_eq!(out.rejections[0].predicate, "accepted_house");
        assert_eq!(out.rejections[0].reason, SkipReason::ExcludedHouse("Lords".into()));
    }

    #[test]
    fn bad_timestamps_are_seen_but_not_recorded() {
        let items = feed(json!({ "items": [
            item(1, "Commons", ""),
            item(2, "Commons", "next Tuesday"),
        ] }));
        let out = intake().run(&items, &ScanLedger::new(), &[]);

        assert_eq!(out.new_identifiers, vec!["1", "2"]);
        assert!(out.new_reports.is_empty());
        assert_eq!(out.rejections[0].reason, SkipReason::MissingTimestamp);
        assert_eq!(
            out.rejections[1].reason,
            SkipReason::UnparseableTimestamp("next Tuesday".into())
        );
    }

    #[test]
    fn rerun_yields_nothing_new() {
        let items = feed(json!({ "items": [item(7, "Commons", "2025-03-12T09:30:00")] }));
        let mut ledger = ScanLedger::new();
        let first = intake().run(&items, &ledger, &[]);
        ledger.record_scan(
            NaiveDateTime::parse_from_str("2025-03-12 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
            first.new_identifiers.clone(),
        );

        let second = intake().run(&items, &ledger, &first.new_reports);
        assert!(second.new_reports.is_empty());
        assert!(second.new_identifiers.is_empty());
        assert_eq!(second.rejections[0].reason, SkipReason::AlreadyRecorded);
    }

    #[test]
    fn repeated_item_in_one_batch_is_counted_once() {
        let items = feed(json!({ "items": [
            item(3, "Commons", "2025-03-12T09:30:00"),
            item(3, "Commons", "2025-03-12T09:30:00"),
        ] }));
        let out = intake().run(&items, &ScanLedger::new(), &[]);
        assert_eq!(out.new_identifiers, vec!["3"]);
        assert_eq!(out.new_reports.len(), 1);
    }

    #[test]
    fn missing_fields_decode_leniently() {
        let items = feed(json!({ "items": [
            { "id": "abc", "committee": null, "hcNumber": null, "description": null },
            { "publicationStartDate": "2025-03-12" }
        ] }));
        let out = intake().run(&items, &ScanLedger::new(), &[]);
        assert_eq!(out.new_identifiers, vec!["abc"]);
        assert!(out.new_reports.is_empty());
        assert_eq!(out.rejections[1].reason, SkipReason::MissingIdentifier);
    }

    #[test]
    fn timestamp_forms() {
        let ts = |s| parse_publication_timestamp(s).map(|t| t.to_string());
        assert_eq!(ts("2025-03-12T00:01:00Z").as_deref(), Some("2025-03-12 00:01:00"));
        assert_eq!(ts("2025-06-12T10:00:00+01:00").as_deref(), Some("2025-06-12 10:00:00"));
        assert_eq!(ts("2025-03-12T09:30:15.250").as_deref(), Some("2025-03-12 09:30:15"));
        assert_eq!(ts("2025-03-12").as_deref(), Some("2025-03-12 00:00:00"));
        assert_eq!(ts("12/03/2025"), None);
    }

    #[test]
    fn predicate_order_is_fixed() {
        let names: Vec<_> = intake().predicates().iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec!["has_identifier", "not_recorded", "accepted_house", "parseable_timestamp"]
        );
    }
}
