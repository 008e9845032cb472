//! One polling run
//!
//! Stages run strictly in order, each against the in-memory tables:
//! 1. Publication intake, then record the scan event
//! 2. Order Paper intake
//! 3. Lateness Engine
//! 4. Order Paper Matcher
//!
//! An upstream failure stops only its own stage. Storage is read once at
//! the start and written once at the end, so a failed stage never leaves a
//! half-written table behind.

use crate::config::{Config, ConfigError};
use crate::intake::{existing_keys, parse_order_paper, OrderPaperIntake, PublicationIntake};
use crate::lateness::compute_lateness;
use crate::matcher::match_order_papers;
use crate::storage::{StorageError, TableStore, Tables};
use crate::upstream::{Upstream, UpstreamError};
use chrono::NaiveDateTime;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("pipeline was built without an upstream")]
    Offline,
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Stages that depend on the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Publications,
    OrderPaper,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Publications => write!(f, "publications"),
            Self::OrderPaper => write!(f, "order paper"),
        }
    }
}

/// What a run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub new_reports: usize,
    pub new_identifiers: usize,
    pub skipped_items: usize,
    pub scan_recorded: bool,
    /// `None` when no Order Paper section was found for the day
    pub new_order_papers: Option<usize>,
    pub lateness_updates: usize,
    pub status_changes: usize,
    pub failed_stages: Vec<Stage>,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.failed_stages.is_empty()
    }
}

pub struct Pipeline {
    config: Config,
    upstream: Option<Arc<dyn Upstream>>,
    store: Arc<dyn TableStore>,
    publications: PublicationIntake,
    order_papers: OrderPaperIntake,
}

impl Pipeline {
    pub fn new(config: Config, upstream: Arc<dyn Upstream>, store: Arc<dyn TableStore>) -> PipelineResult<Self> {
        Self::build(config, Some(upstream), store)
    }

    /// A pipeline for the table-only passes (`recompute_lateness`,
    /// `rematch`). `run` fails with [`PipelineError::Offline`].
    pub fn offline(config: Config, store: Arc<dyn TableStore>) -> PipelineResult<Self> {
        Self::build(config, None, store)
    }

    fn build(config: Config, upstream: Option<Arc<dyn Upstream>>, store: Arc<dyn TableStore>) -> PipelineResult<Self> {
        let publications = PublicationIntake::new(config.grammar()?, config.accepted_houses.clone());
        Ok(Self {
            config,
            upstream,
            store,
            publications,
            order_papers: OrderPaperIntake::default(),
        })
    }

    /// Run every stage as of `now` and persist the result.
    pub async fn run(&self, now: NaiveDateTime) -> PipelineResult<RunSummary> {
        let upstream = self.upstream.as_deref().ok_or(PipelineError::Offline)?;
        let mut tables = self.store.load_all()?;
        let mut summary = RunSummary::default();

        match upstream.fetch_publications().await {
            Ok(items) => {
                let outcome = self.publications.run(&items, &tables.scans, &tables.reports);
                info!(
                    items = items.len(),
                    new_reports = outcome.new_reports.len(),
                    new_identifiers = outcome.new_identifiers.len(),
                    skipped = outcome.rejections.len(),
                    "publication intake"
                );
                summary.new_reports = outcome.new_reports.len();
                summary.new_identifiers = outcome.new_identifiers.len();
                summary.skipped_items = outcome.rejections.len();

                tables.reports.extend(outcome.new_reports);
                tables.scans.record_scan(now, outcome.new_identifiers);
                summary.scan_recorded = true;
            }
            Err(e) => {
                warn!(error = %e, "publications feed unavailable, no scan recorded");
                summary.failed_stages.push(Stage::Publications);
            }
        }

        match self.order_paper_stage(upstream, &mut tables, now).await {
            Ok(added) => summary.new_order_papers = added,
            Err(e) => {
                warn!(error = %e, "order paper stage failed");
                summary.failed_stages.push(Stage::OrderPaper);
            }
        }

        summary.lateness_updates = self.apply_lateness(&mut tables);
        summary.status_changes = self.apply_matching(&mut tables, now);

        self.store.save_all(&tables)?;
        info!(
            reports = tables.reports.len(),
            scans = tables.scans.len(),
            order_papers = tables.order_papers.len(),
            "tables written"
        );
        Ok(summary)
    }

    /// Recompute lateness only, without touching upstream.
    pub fn recompute_lateness(&self) -> PipelineResult<usize> {
        let mut tables = self.store.load_all()?;
        let updated = self.apply_lateness(&mut tables);
        self.store.save_all(&tables)?;
        Ok(updated)
    }

    /// Re-run the matcher only, as of `now`.
    pub fn rematch(&self, now: NaiveDateTime) -> PipelineResult<usize> {
        let mut tables = self.store.load_all()?;
        let changed = self.apply_matching(&mut tables, now);
        self.store.save_all(&tables)?;
        Ok(changed)
    }

    async fn order_paper_stage(
        &self,
        upstream: &dyn Upstream,
        tables: &mut Tables,
        now: NaiveDateTime,
    ) -> PipelineResult<Option<usize>> {
        let date = now.date();
        let Some(id) = upstream.find_order_paper(date).await? else {
            info!(%date, "no order paper issued yet");
            return Ok(None);
        };
        let html = upstream.fetch_document_html(&id).await?;
        let Some(document) = parse_order_paper(&html, &self.config.section_heading) else {
            info!(%date, document = %id, "order paper has no committee reports section");
            return Ok(None);
        };

        let added = self.order_papers.run(&document, &existing_keys(&tables.order_papers));
        info!(%date, document = %id, added = added.len(), "order paper intake");
        let count = added.len();
        tables.order_papers.extend(added);
        Ok(Some(count))
    }

    fn apply_lateness(&self, tables: &mut Tables) -> usize {
        let updates = compute_lateness(&mut tables.reports, &tables.scans);
        if !updates.is_empty() {
            info!(updated = updates.len(), "lateness computed");
        }
        updates.len()
    }

    fn apply_matching(&self, tables: &mut Tables, now: NaiveDateTime) -> usize {
        let changes = match_order_papers(&mut tables.order_papers, &tables.reports, now);
        if !changes.is_empty() {
            info!(changed = changes.len(), "order paper statuses updated");
        }
        changes.len()
    }
}
