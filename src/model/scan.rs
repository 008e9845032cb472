//! Scan events

use chrono::NaiveDateTime;

/// Separator between identifiers in the persisted `New Publication IDs` cell
pub const ID_SEPARATOR: &str = ", ";

/// One poll of the publications feed.
///
/// `identifiers` holds only the identifiers this poll saw for the first
/// time, in feed order. It may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    pub at: NaiveDateTime,
    pub identifiers: Vec<String>,
}

impl ScanEvent {
    pub fn new(at: NaiveDateTime, identifiers: Vec<String>) -> Self {
        Self { at, identifiers }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers.iter().any(|id| id == identifier)
    }

    /// Identifiers joined for persistence
    pub fn joined_identifiers(&self) -> String {
        self.identifiers.join(ID_SEPARATOR)
    }

    /// Split a persisted identifier cell. Blank entries are dropped.
    pub fn split_identifiers(cell: &str) -> Vec<String> {
        cell.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}
