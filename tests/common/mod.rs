//! Common test utilities for pipeline tests
//!
//! Provides an in-memory upstream double and fixture builders for feed
//! items and Order Paper documents.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reportwatch::{PublicationItem, Upstream, UpstreamError, UpstreamResult};
use serde_json::json;
use std::sync::Mutex;

pub const SECTION_HEADING: &str = "Committee Reports Published Today";

#[derive(Debug, Default)]
struct FakeState {
    items: Vec<PublicationItem>,
    order_paper: Option<(String, String)>,
    fail_publications: bool,
    fail_order_paper: bool,
}

/// Upstream double serving canned responses
///
/// Responses can be swapped between runs to simulate the feed changing.
#[derive(Debug, Default)]
pub struct FakeUpstream {
    state: Mutex<FakeState>,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(self, items: Vec<PublicationItem>) -> Self {
        self.set_items(items);
        self
    }

    pub fn with_order_paper(self, id: &str, html: &str) -> Self {
        self.state.lock().unwrap().order_paper = Some((id.to_string(), html.to_string()));
        self
    }

    pub fn set_items(&self, items: Vec<PublicationItem>) {
        self.state.lock().unwrap().items = items;
    }

    pub fn set_fail_publications(&self, fail: bool) {
        self.state.lock().unwrap().fail_publications = fail;
    }

    pub fn set_fail_order_paper(&self, fail: bool) {
        self.state.lock().unwrap().fail_order_paper = fail;
    }
}

fn unavailable(url: &str) -> UpstreamError {
    UpstreamError::Status {
        url: url.to_string(),
        status: 503,
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn fetch_publications(&self) -> UpstreamResult<Vec<PublicationItem>> {
        let state = self.state.lock().unwrap();
        if state.fail_publications {
            return Err(unavailable("fake://publications"));
        }
        Ok(state.items.clone())
    }

    async fn find_order_paper(&self, _date: NaiveDate) -> UpstreamResult<Option<String>> {
        let state = self.state.lock().unwrap();
        if state.fail_order_paper {
            return Err(unavailable("fake://documents"));
        }
        Ok(state.order_paper.as_ref().map(|(id, _)| id.clone()))
    }

    async fn fetch_document_html(&self, id: &str) -> UpstreamResult<String> {
        let state = self.state.lock().unwrap();
        match &state.order_paper {
            Some((known, html)) if known == id => Ok(html.clone()),
            _ => Err(UpstreamError::Status {
                url: format!("fake://document/{}", id),
                status: 404,
            }),
        }
    }
}

/// One publications feed item
pub fn feed_item(id: u64, house: &str, hc_number: &str, published: &str) -> PublicationItem {
    serde_json::from_value(json!({
        "id": id,
        "committee": { "name": "Treasury Committee", "house": house },
        "description": "5th Report - Budget 2025",
        "publicationStartDate": published,
        "hcNumber": { "number": hc_number, "sessionDescription": "2024-25" }
    }))
    .unwrap()
}

/// Order Paper for Wednesday 12 March 2025 with three committee reports
pub fn order_paper_html() -> String {
    format!(
        r#"<html><body>
        <h1>Order Paper for Wednesday 12 March 2025</h1>
        <h3>Business Today: Chamber</h3>
        <p>Prayers</p>
        <h3>{heading}</h3>
        <h5>Treasury Committee</h5>
        <p><strong>5th Report - Budget 2025</strong> <span class="Roman">HC 661</span> <strong>Wed 12 March, 9.30am</strong></p>
        <h5>Health and Social Care Committee</h5>
        <p><strong>2nd Report - Waiting Lists</strong> <span class="Roman">HC 702</span> <strong>Wed 12 March, 3pm</strong></p>
        <h5>Defence Committee</h5>
        <p><strong>1st Report - Readiness</strong> <span class="Roman">HC 9</span> <strong>Wed 12 March, 00:01</strong></p>
        <h3>Written Statements</h3>
        </body></html>"#,
        heading = SECTION_HEADING
    )
}

/// Order Paper with no committee reports section
pub fn order_paper_without_section() -> String {
    "<html><body><h1>Order Paper for Wednesday 12 March 2025</h1><h3>Written Statements</h3></body></html>".to_string()
}

/// `2025-03-12 HH:MM:00`
pub fn march_12(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 12)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}
