//! Intake: turning upstream observations into new table rows
//!
//! Both intakes are pure functions of (upstream batch, existing state); they
//! return the rows to append and never touch storage.

mod document;
mod order_paper;
mod publications;

pub use document::{parse_order_paper, OrderPaperDocument, OrderPaperRow, SectionLayout};
pub use order_paper::{existing_keys, OrderPaperIntake};
pub use publications::{
    parse_publication_timestamp, CommitteeRef, HcNumberRef, IntakeOutcome, Predicate,
    PublicationFeed, PublicationIntake, PublicationItem, Rejection, SkipReason,
};
