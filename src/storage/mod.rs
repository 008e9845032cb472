//! Storage backends for the three tables
//!
//! Storage is whole-table: `load_all()` reads every table into memory and
//! `save_all()` writes every table back. The primary implementation is
//! `CsvStore`; `MemoryStore` backs tests and dry runs.

mod csv;
mod memory;
mod traits;

pub use self::csv::{CsvStore, ORDER_PAPER_COLUMNS, REPORT_COLUMNS, SCAN_COLUMNS};
pub use memory::MemoryStore;
pub use traits::{OpenStore, StorageError, StorageResult, TableStore, Tables};
