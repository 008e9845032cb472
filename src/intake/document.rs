//! Order Paper HTML → rows
//!
//! The business date comes from the `Order Paper for ...` heading. The
//! target section is either an `<h3>` followed by `<h5>` committee / `<p>`
//! entry pairs, or a `<table>` captioned with the section heading.

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

const TITLE_PREFIX: &str = "Order Paper for ";

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Which shape the section had
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionLayout {
    Headings,
    Table,
}

/// One entry row, text collapsed, nothing parsed yet
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderPaperRow {
    pub committee: String,
    pub description: String,
    pub hc_number: String,
    /// Free-text date/time cell, e.g. `"Wed 12 March, 2:30pm"`
    pub when: String,
}

/// The parsed section of one Order Paper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPaperDocument {
    pub business_date: NaiveDate,
    pub layout: SectionLayout,
    pub rows: Vec<OrderPaperRow>,
}

/// Parse an Order Paper. `None` when the document has no business date
/// heading or no section titled `heading`.
pub fn parse_order_paper(html: &str, heading: &str) -> Option<OrderPaperDocument> {
    let doc = Html::parse_document(html);
    let business_date = business_date(&doc)?;
    let heading = collapse(heading);

    if let Some(rows) = heading_section(&doc, &heading) {
        return Some(OrderPaperDocument {
            business_date,
            layout: SectionLayout::Headings,
            rows,
        });
    }
    table_section(&doc, &heading).map(|rows| OrderPaperDocument {
        business_date,
        layout: SectionLayout::Table,
        rows,
    })
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn text_of(el: &ElementRef<'_>) -> String {
    collapse(&el.text().collect::<String>())
}

fn tag(el: &ElementRef<'_>) -> String {
    el.value().name().to_ascii_lowercase()
}

fn business_date(doc: &Html) -> Option<NaiveDate> {
    let h1 = selector("h1")?;
    doc.select(&h1).find_map(|el| {
        let text = text_of(&el);
        let rest = text.strip_prefix(TITLE_PREFIX)?.trim();
        let rest = match rest.split_once(' ') {
            Some((first, tail)) if WEEKDAYS.contains(&first.to_ascii_lowercase().as_str()) => tail,
            _ => rest,
        };
        NaiveDate::parse_from_str(rest.trim(), "%d %B %Y").ok()
    })
}

fn heading_section(doc: &Html, heading: &str) -> Option<Vec<OrderPaperRow>> {
    let h3 = selector("h3")?;
    let target = doc.select(&h3).find(|el| text_of(el) == heading)?;

    let section: Vec<ElementRef<'_>> = target
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|el| !matches!(tag(el).as_str(), "h1" | "h2" | "h3"))
        .collect();

    let mut rows = Vec::new();
    for (idx, el) in section.iter().enumerate() {
        if tag(el) != "h5" {
            continue;
        }
        let paragraph = section[idx + 1..]
            .iter()
            .take_while(|next| tag(next) != "h5")
            .find(|next| tag(next) == "p");
        if let Some(p) = paragraph {
            rows.push(entry_from_paragraph(text_of(el), p));
        }
    }
    Some(rows)
}

fn entry_from_paragraph(committee: String, p: &ElementRef<'_>) -> OrderPaperRow {
    let strongs: Vec<String> = selector("strong")
        .map(|s| p.select(&s).map(|el| text_of(&el)).collect())
        .unwrap_or_default();

    let hc_number = selector(r#"span[class*="Roman"]"#)
        .and_then(|s| {
            p.select(&s)
                .map(|el| text_of(&el))
                .find(|text| text.starts_with("HC "))
        })
        .unwrap_or_default();

    OrderPaperRow {
        committee,
        description: strongs.first().cloned().unwrap_or_default(),
        hc_number,
        when: strongs.get(1).cloned().unwrap_or_default(),
    }
}

fn table_section(doc: &Html, heading: &str) -> Option<Vec<OrderPaperRow>> {
    let table_sel = selector("table")?;
    let caption_sel = selector("caption")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td")?;

    let table = doc.select(&table_sel).find(|table| {
        table
            .select(&caption_sel)
            .next()
            .is_some_and(|caption| text_of(&caption) == heading)
    })?;

    let rows = table
        .select(&row_sel)
        .filter_map(|tr| {
            let cells: Vec<String> = tr.select(&cell_sel).map(|td| text_of(&td)).collect();
            if cells.len() < 4 {
                return None;
            }
            Some(OrderPaperRow {
                committee: cells[0].clone(),
                description: cells[1].clone(),
                hc_number: cells[2].clone(),
                when: cells[3].clone(),
            })
        })
        .collect();
    Some(rows)
}
