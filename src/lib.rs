//! reportwatch: committee report publication tracking
//!
//! Reconciles two independently updated sources, the committees
//! publications feed and the daily Order Paper, into three append-only
//! tables, then works out how late each report appeared.
//!
//! # Core Concepts
//!
//! - **Reports**: publications accepted from the feed (Commons and Joint only)
//! - **Scan Ledger**: one event per poll, holding identifiers first seen in it
//! - **Order Paper entries**: expected publications, each with a status
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use reportwatch::{extract_date_time, OrdinalGrammar, YearPolicy};
//!
//! let anchor = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
//! let found = extract_date_time("Wed 12 March, 2:30pm", anchor, YearPolicy::AnchorYear);
//! assert_eq!(found.date, NaiveDate::from_ymd_opt(2025, 3, 12));
//!
//! let split = OrdinalGrammar::default().split("58th Report - Annual Review");
//! assert_eq!(split.ordinal, "58th Report");
//! ```

pub mod config;
pub mod extract;
pub mod intake;
pub mod lateness;
pub mod ledger;
pub mod matcher;
pub mod model;
pub mod pipeline;
pub mod storage;
pub mod upstream;

pub use config::{Config, ConfigError, ConfigResult, HttpSettings};
pub use extract::{extract_date_time, Extracted, OrdinalGrammar, OrdinalKind, OrdinalSpec, TitleSplit, YearPolicy};
pub use intake::{
    parse_order_paper, IntakeOutcome, OrderPaperDocument, OrderPaperIntake, PublicationIntake, PublicationItem,
    SkipReason,
};
pub use lateness::{bracket, compute_lateness, format_delta, Bracket};
pub use ledger::ScanLedger;
pub use matcher::{match_order_papers, StatusChange};
pub use model::{House, OrderPaperEntry, OrderPaperStatus, Report, ScanEvent};
pub use pipeline::{Pipeline, PipelineError, PipelineResult, RunSummary, Stage};
pub use storage::{CsvStore, MemoryStore, OpenStore, StorageError, StorageResult, TableStore, Tables};
pub use upstream::{HttpUpstream, Upstream, UpstreamError, UpstreamResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
