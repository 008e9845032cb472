//! End-to-end runs of the polling pipeline against an upstream double.

mod common;

use common::{feed_item, march_12, order_paper_html, order_paper_without_section, FakeUpstream};
use reportwatch::{
    Config, CsvStore, MemoryStore, OrderPaperStatus, Pipeline, PipelineError, Stage, TableStore, Tables,
    Upstream,
};
use std::sync::Arc;

fn first_feed() -> Vec<reportwatch::PublicationItem> {
    vec![
        feed_item(100, "Lords", "12", "2025-03-11T10:00:00Z"),
        feed_item(101, "Commons", "9", "2025-03-12T00:01:00Z"),
    ]
}

fn later_feed() -> Vec<reportwatch::PublicationItem> {
    let mut items = first_feed();
    items.insert(0, feed_item(102, "Joint", "HC 661", "2025-03-12T09:30:00Z"));
    items
}

fn pipeline(upstream: &Arc<FakeUpstream>, store: &Arc<dyn TableStore>) -> Pipeline {
    let upstream: Arc<dyn Upstream> = upstream.clone();
    Pipeline::new(Config::default(), upstream, store.clone()).unwrap()
}

fn status_of(tables: &Tables, hc: &str) -> Option<OrderPaperStatus> {
    tables
        .order_papers
        .iter()
        .find(|e| e.hc_number == hc)
        .and_then(|e| e.status)
}

// ============================================================================
// Full scenario
// ============================================================================

#[tokio::test]
async fn reports_lateness_and_statuses_across_runs() {
    let upstream = Arc::new(
        FakeUpstream::new()
            .with_items(first_feed())
            .with_order_paper("op-1", &order_paper_html()),
    );
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn TableStore> = memory.clone();
    let pipeline = pipeline(&upstream, &store);

    // 09:00: the Commons report is in, the Lords one is only seen
    let first = pipeline.run(march_12(9, 0)).await.unwrap();
    assert!(first.is_clean());
    assert_eq!(first.new_reports, 1);
    assert_eq!(first.new_identifiers, 2);
    assert_eq!(first.skipped_items, 1);
    assert_eq!(first.new_order_papers, Some(3));

    let tables = memory.snapshot();
    assert_eq!(tables.reports.len(), 1);
    let early = &tables.reports[0];
    assert_eq!(early.publication_id, "101");
    assert_eq!(early.late_by_max.as_deref(), Some("8:59:00"));
    assert_eq!(early.late_by_min, None);
    assert_eq!(status_of(&tables, "HC 9"), Some(OrderPaperStatus::Published));
    assert_eq!(status_of(&tables, "HC 661"), Some(OrderPaperStatus::Due));
    assert_eq!(status_of(&tables, "HC 702"), Some(OrderPaperStatus::Due));

    // 10:00: nothing new, the 09:30 report is now overdue
    let second = pipeline.run(march_12(10, 0)).await.unwrap();
    assert_eq!(second.new_reports, 0);
    assert_eq!(second.new_identifiers, 0);
    assert!(second.scan_recorded);
    assert_eq!(second.new_order_papers, Some(0));
    assert_eq!(second.lateness_updates, 0);
    assert_eq!(second.status_changes, 1);
    let tables = memory.snapshot();
    assert_eq!(tables.scans.len(), 2);
    assert!(tables.scans.events()[1].identifiers.is_empty());
    assert_eq!(status_of(&tables, "HC 661"), Some(OrderPaperStatus::Missing));

    // 11:00: the 09:30 report finally appears
    upstream.set_items(later_feed());
    let third = pipeline.run(march_12(11, 0)).await.unwrap();
    assert_eq!(third.new_reports, 1);
    assert_eq!(third.new_identifiers, 1);
    assert_eq!(third.lateness_updates, 1);
    assert_eq!(third.status_changes, 1);

    let tables = memory.snapshot();
    let late = tables.reports.iter().find(|r| r.publication_id == "102").unwrap();
    assert_eq!(late.late_by_min.as_deref(), Some("0:30:00"));
    assert_eq!(late.late_by_max.as_deref(), Some("1:30:00"));
    assert_eq!(status_of(&tables, "HC 661"), Some(OrderPaperStatus::Published));
    assert_eq!(status_of(&tables, "HC 702"), Some(OrderPaperStatus::Due));

    // 16:00: the 15:00 report never came
    pipeline.run(march_12(16, 0)).await.unwrap();
    let tables = memory.snapshot();
    assert_eq!(status_of(&tables, "HC 702"), Some(OrderPaperStatus::Missing));
    // Earlier bounds are untouched
    let early = tables.reports.iter().find(|r| r.publication_id == "101").unwrap();
    assert_eq!(early.late_by_max.as_deref(), Some("8:59:00"));
}

#[tokio::test]
async fn repeated_run_only_appends_an_empty_scan() {
    let upstream = Arc::new(
        FakeUpstream::new()
            .with_items(first_feed())
            .with_order_paper("op-1", &order_paper_html()),
    );
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn TableStore> = memory.clone();
    let pipeline = pipeline(&upstream, &store);

    pipeline.run(march_12(9, 0)).await.unwrap();
    let before = memory.snapshot();
    let again = pipeline.run(march_12(9, 0)).await.unwrap();
    let after = memory.snapshot();

    assert_eq!(again.new_reports, 0);
    assert_eq!(again.new_order_papers, Some(0));
    assert_eq!(again.status_changes, 0);
    assert_eq!(before.reports, after.reports);
    assert_eq!(before.order_papers, after.order_papers);
    assert_eq!(after.scans.len(), before.scans.len() + 1);
    assert_eq!(after.scans.all_seen_identifiers(), before.scans.all_seen_identifiers());
}

// ============================================================================
// Degraded upstream
// ============================================================================

#[tokio::test]
async fn feed_failure_records_no_scan() {
    let upstream = Arc::new(FakeUpstream::new().with_order_paper("op-1", &order_paper_html()));
    upstream.set_fail_publications(true);
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn TableStore> = memory.clone();

    let summary = pipeline(&upstream, &store).run(march_12(9, 0)).await.unwrap();

    assert_eq!(summary.failed_stages, vec![Stage::Publications]);
    assert!(!summary.scan_recorded);
    assert!(!summary.is_clean());
    // The Order Paper stage still ran
    assert_eq!(summary.new_order_papers, Some(3));
    let tables = memory.snapshot();
    assert!(tables.scans.is_empty());
    assert_eq!(tables.order_papers.len(), 3);
}

#[tokio::test]
async fn order_paper_failure_keeps_publications() {
    let upstream = Arc::new(FakeUpstream::new().with_items(first_feed()));
    upstream.set_fail_order_paper(true);
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn TableStore> = memory.clone();

    let summary = pipeline(&upstream, &store).run(march_12(9, 0)).await.unwrap();

    assert_eq!(summary.failed_stages, vec![Stage::OrderPaper]);
    assert_eq!(summary.new_order_papers, None);
    assert_eq!(memory.snapshot().reports.len(), 1);
}

#[tokio::test]
async fn no_order_paper_or_section_is_not_an_error() {
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn TableStore> = memory.clone();

    let not_issued = Arc::new(FakeUpstream::new().with_items(first_feed()));
    let summary = pipeline(&not_issued, &store).run(march_12(7, 0)).await.unwrap();
    assert!(summary.is_clean());
    assert_eq!(summary.new_order_papers, None);

    let no_section = Arc::new(
        FakeUpstream::new()
            .with_items(first_feed())
            .with_order_paper("op-1", &order_paper_without_section()),
    );
    let summary = pipeline(&no_section, &store).run(march_12(8, 0)).await.unwrap();
    assert!(summary.is_clean());
    assert_eq!(summary.new_order_papers, None);
    assert!(memory.snapshot().order_papers.is_empty());
}

// ============================================================================
// CSV persistence
// ============================================================================

#[test]
fn csv_tables_survive_between_processes() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    let upstream = Arc::new(
        FakeUpstream::new()
            .with_items(first_feed())
            .with_order_paper("op-1", &order_paper_html()),
    );

    let store: Arc<dyn TableStore> = Arc::new(CsvStore::from_config(&config));
    let first = pipeline(&upstream, &store);
    tokio_test::block_on(first.run(march_12(9, 0))).unwrap();
    tokio_test::block_on(first.run(march_12(10, 0))).unwrap();

    // A fresh store reading the same files picks up where the last left off
    upstream.set_items(later_feed());
    let reopened: Arc<dyn TableStore> = Arc::new(CsvStore::from_config(&config));
    let second = pipeline(&upstream, &reopened);
    let summary = tokio_test::block_on(second.run(march_12(11, 0))).unwrap();
    assert_eq!(summary.new_identifiers, 1);

    let tables = reopened.load_all().unwrap();
    assert_eq!(tables.reports.len(), 2);
    assert_eq!(tables.scans.len(), 3);
    let late = tables.reports.iter().find(|r| r.publication_id == "102").unwrap();
    assert_eq!(late.late_by_min.as_deref(), Some("0:30:00"));
    assert_eq!(status_of(&tables, "HC 661"), Some(OrderPaperStatus::Published));

    let reports_csv = std::fs::read_to_string(config.reports_path()).unwrap();
    assert!(reports_csv.starts_with("Publication ID,HC Number,Session,Committee Name,House"));
    let scans_csv = std::fs::read_to_string(config.scans_path()).unwrap();
    assert!(scans_csv.contains("\"100, 101\""));
}

#[test]
fn offline_lateness_pass_fills_missing_bounds() {
    let upstream = Arc::new(FakeUpstream::new().with_items(first_feed()));
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn TableStore> = memory.clone();
    let pipeline = pipeline(&upstream, &store);
    tokio_test::block_on(pipeline.run(march_12(9, 0))).unwrap();

    // Wipe the bounds, as if written by an older version
    let mut tables = memory.snapshot();
    for report in &mut tables.reports {
        report.late_by_min = None;
        report.late_by_max = None;
    }
    memory.save_all(&tables).unwrap();

    assert_eq!(pipeline.recompute_lateness().unwrap(), 1);
    assert_eq!(pipeline.recompute_lateness().unwrap(), 0);
    assert_eq!(memory.snapshot().reports[0].late_by_max.as_deref(), Some("8:59:00"));
}

#[test]
fn offline_pipeline_updates_tables_without_upstream() {
    let upstream = Arc::new(
        FakeUpstream::new()
            .with_items(first_feed())
            .with_order_paper("op-1", &order_paper_html()),
    );
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn TableStore> = memory.clone();
    tokio_test::block_on(pipeline(&upstream, &store).run(march_12(9, 0))).unwrap();

    let offline = Pipeline::offline(Config::default(), store.clone()).unwrap();
    assert_eq!(offline.recompute_lateness().unwrap(), 0);
    // 09:30 and 15:00 entries are both overdue by 16:00
    assert_eq!(offline.rematch(march_12(16, 0)).unwrap(), 2);
    let tables = memory.snapshot();
    assert_eq!(status_of(&tables, "HC 661"), Some(OrderPaperStatus::Missing));
    assert_eq!(status_of(&tables, "HC 702"), Some(OrderPaperStatus::Missing));

    let refused = tokio_test::block_on(offline.run(march_12(17, 0)));
    assert!(matches!(refused, Err(PipelineError::Offline)));
    assert_eq!(memory.snapshot().scans.len(), 1);
}
