//! Record types for the three persisted tables
//!
//! - **Report**: one committee report observed in the publications feed
//! - **ScanEvent**: one poll of the feed and the identifiers it saw first
//! - **OrderPaperEntry**: one expected publication listed on an Order Paper

mod order_paper;
mod report;
mod scan;

pub use order_paper::{normalize_hc_number, OrderPaperEntry, OrderPaperKey, OrderPaperStatus};
pub use report::{House, Report};
pub use scan::ScanEvent;

/// Date format used in every persisted table
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time format used in every persisted table
pub const TIME_FORMAT: &str = "%H:%M:%S";
