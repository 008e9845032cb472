//! CSV storage backend
//!
//! One header-named file per table. Column names and order are fixed so
//! tables written by earlier runs keep loading. Writes go to a sibling
//! temporary file that is then renamed over the original.

use super::traits::{OpenStore, StorageError, StorageResult, TableStore, Tables};
use crate::config::Config;
use crate::ledger::ScanLedger;
use crate::model::{OrderPaperEntry, Report, ScanEvent};
use ::csv::{ReaderBuilder, Trim, WriterBuilder};
use chrono::{NaiveDate, NaiveTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const REPORT_COLUMNS: [&str; 11] = [
    "Publication ID",
    "HC Number",
    "Session",
    "Committee Name",
    "House",
    "Report Title",
    "Report Ordinal",
    "Publication Date",
    "Publication Time",
    "Late by min",
    "Late by max",
];

pub const SCAN_COLUMNS: [&str; 3] = ["Scan date", "Scan time", "New Publication IDs"];

pub const ORDER_PAPER_COLUMNS: [&str; 7] = [
    "Order Paper date",
    "Committee name",
    "Report description",
    "HC Number",
    "Publication date",
    "Publication time",
    "HC matched",
];

/// Persisted shape of a scan event
#[derive(Debug, Serialize, Deserialize)]
struct ScanRow {
    #[serde(rename = "Scan date")]
    date: NaiveDate,
    #[serde(rename = "Scan time")]
    time: NaiveTime,
    #[serde(rename = "New Publication IDs", default)]
    identifiers: String,
}

impl From<ScanRow> for ScanEvent {
    fn from(row: ScanRow) -> Self {
        ScanEvent::new(row.date.and_time(row.time), ScanEvent::split_identifiers(&row.identifiers))
    }
}

impl From<&ScanEvent> for ScanRow {
    fn from(event: &ScanEvent) -> Self {
        ScanRow {
            date: event.at.date(),
            time: event.at.time(),
            identifiers: event.joined_identifiers(),
        }
    }
}

/// CSV-backed table store
#[derive(Debug, Clone)]
pub struct CsvStore {
    reports: PathBuf,
    scans: PathBuf,
    order_papers: PathBuf,
}

impl CsvStore {
    pub fn new(reports: impl Into<PathBuf>, scans: impl Into<PathBuf>, order_papers: impl Into<PathBuf>) -> Self {
        Self {
            reports: reports.into(),
            scans: scans.into(),
            order_papers: order_papers.into(),
        }
    }

    /// Store at the paths named by `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.reports_path(), config.scans_path(), config.order_papers_path())
    }

    pub fn reports_path(&self) -> &Path {
        &self.reports
    }

    pub fn scans_path(&self) -> &Path {
        &self.scans
    }

    pub fn order_papers_path(&self) -> &Path {
        &self.order_papers
    }
}

fn csv_error(path: &Path) -> impl FnOnce(::csv::Error) -> StorageError + '_ {
    move |source| StorageError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> StorageResult<Vec<T>> {
    if !path.is_file() {
        debug!(path = %path.display(), "table absent, starting empty");
        return Ok(Vec::new());
    }
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(csv_error(path))?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(csv_error(path))
}

fn write_rows<T: Serialize>(path: &Path, columns: &[&str], rows: impl IntoIterator<Item = T>) -> StorageResult<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(io_error(dir))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(&tmp)
        .map_err(csv_error(&tmp))?;
    writer.write_record(columns).map_err(csv_error(&tmp))?;
    for row in rows {
        writer.serialize(row).map_err(csv_error(&tmp))?;
    }
    writer.flush().map_err(io_error(&tmp))?;
    drop(writer);

    std::fs::rename(&tmp, path).map_err(io_error(path))
}

impl TableStore for CsvStore {
    fn load_all(&self) -> StorageResult<Tables> {
        let reports: Vec<Report> = read_rows(&self.reports)?;
        let scans: Vec<ScanRow> = read_rows(&self.scans)?;
        let order_papers: Vec<OrderPaperEntry> = read_rows(&self.order_papers)?;

        Ok(Tables {
            reports,
            scans: ScanLedger::from_events(scans.into_iter().map(ScanEvent::from).collect()),
            order_papers,
        })
    }

    fn save_all(&self, tables: &Tables) -> StorageResult<()> {
        write_rows(&self.reports, &REPORT_COLUMNS, &tables.reports)?;
        write_rows(&self.scans, &SCAN_COLUMNS, tables.scans.events().iter().map(ScanRow::from))?;
        write_rows(&self.order_papers, &ORDER_PAPER_COLUMNS, &tables.order_papers)
    }
}

impl OpenStore for CsvStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let dir = path.as_ref();
        std::fs::create_dir_all(dir).map_err(io_error(dir))?;
        let defaults = Config::default();
        Ok(Self::new(
            dir.join(defaults.reports_file),
            dir.join(defaults.scans_file),
            dir.join(defaults.order_papers_file),
        ))
    }
}
