//! Storage trait definitions

use crate::ledger::ScanLedger;
use crate::model::{OrderPaperEntry, Report};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: ::csv::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Every persisted table, in memory
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub reports: Vec<Report>,
    pub scans: ScanLedger,
    pub order_papers: Vec<OrderPaperEntry>,
}

/// Trait for table storage backends
///
/// Implementations must be thread-safe (Send + Sync). Runs never write
/// concurrently; one process owns the tables for the duration of a run.
pub trait TableStore: Send + Sync {
    /// Read every table. Absent tables load empty.
    fn load_all(&self) -> StorageResult<Tables>;

    /// Replace every table with `tables`.
    fn save_all(&self, tables: &Tables) -> StorageResult<()>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: TableStore + Sized {
    /// Open or create a store rooted at the given directory
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;
}
