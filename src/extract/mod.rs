//! Free-text parsing
//!
//! Two small parsers feed the intake stages:
//! - [`extract_date_time`] pulls a calendar date and a clock time out of an
//!   Order Paper fragment such as `"Wed 12 March, 2:30pm"`.
//! - [`OrdinalGrammar`] splits a report description into its ordinal prefix
//!   (`"58th Report"`) and title.

mod datetime;
mod title;

pub use datetime::{extract_date_time, month_number, parse_time, Extracted, YearPolicy};
pub use title::{OrdinalGrammar, OrdinalKind, OrdinalSpec, TitleSplit};
