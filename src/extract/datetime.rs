//! Date and time extraction from Order Paper text
//!
//! The input has no fixed schema: fragments look like `"2:30pm"`,
//! `"Wed 12 March, 2.30 pm"`, `"Thursday 3 April 2025 at 00:01"` or just
//! `"12 March"`. Anything not confidently parsed comes back as `None`; the
//! caller decides on the fallback.

use chrono::{Datelike, NaiveDate, NaiveTime};
use regex_lite::{Captures, Regex};
use std::sync::LazyLock;

/// Hour, optional `:`/`.` separated minutes, optional meridiem.
/// A candidate only counts as a time when it has minutes or a meridiem.
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?P<h>\d{1,2})(?:[:.](?P<m>\d{2}))?\s*(?P<ampm>am|pm)?\b")
        .expect("time pattern compiles")
});

/// `a.m.` / `p.m.` spelled with dots
static DOTTED_MERIDIEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([ap])\.\s?m\b\.?").expect("meridiem pattern compiles")
});

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tues|tue|wed|thurs|thur|thu|fri|sat|sun)\.?\s+)?(?P<day>\d{1,2})(?:st|nd|rd|th)?\s+(?P<month>[a-z]+)\.?(?:\s+(?P<year>\d{4}))?$",
    )
    .expect("date pattern compiles")
});

static TRAILING_CONNECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(?:at|from|by|on)$").expect("connective pattern compiles")
});

static LEADING_CONNECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:at|from|by|on)\s+").expect("connective pattern compiles")
});

/// How to fill in a year the text leaves out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearPolicy {
    /// Use the anchor's year as-is.
    #[default]
    AnchorYear,
    /// Use the anchor's year, then move forward one year if the date
    /// would land before the anchor.
    RollForward,
}

/// Result of [`extract_date_time`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extracted {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

impl Extracted {
    /// Date, or the anchor when none was found
    pub fn date_or(&self, anchor: NaiveDate) -> NaiveDate {
        self.date.unwrap_or(anchor)
    }
}

/// Extract an optional date and an optional time from `text`.
///
/// `anchor` supplies the year when the text has none.
pub fn extract_date_time(text: &str, anchor: NaiveDate, policy: YearPolicy) -> Extracted {
    let normalized = normalize(text);
    let time_match = find_time(&normalized);

    let remainder = match &time_match {
        Some((_, start, end)) => format!("{} {}", &normalized[..*start], &normalized[*end..]),
        None => normalized.clone(),
    };

    Extracted {
        date: parse_date(&remainder, anchor, policy),
        time: time_match.and_then(|(time, _, _)| time),
    }
}

/// Parse a time on its own, ignoring any date in the text.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    find_time(&normalize(text)).and_then(|(time, _, _)| time)
}

/// Month number for a full name or an abbreviation
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.trim().trim_end_matches('.').to_ascii_lowercase();
    let month = match lower.as_str() {
        "january" => 1,
        "february" => 2,
        "march" => 3,
        "april" => 4,
        "may" => 5,
        "june" => 6,
        "july" => 7,
        "august" => 8,
        "september" | "sept" => 9,
        "october" => 10,
        "november" => 11,
        "december" => 12,
        _ => {
            let prefix: String = lower.chars().take(3).collect();
            match prefix.as_str() {
                "jan" => 1,
                "feb" => 2,
                "mar" => 3,
                "apr" => 4,
                "may" => 5,
                "jun" => 6,
                "jul" => 7,
                "aug" => 8,
                "sep" => 9,
                "oct" => 10,
                "nov" => 11,
                "dec" => 12,
                _ => return None,
            }
        }
    };
    Some(month)
}

fn normalize(text: &str) -> String {
    let text = text.replace('\u{00B7}', ".");
    let text = DOTTED_MERIDIEM_RE.replace_all(&text, "${1}m");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First time-like span: the parsed value (if valid) and its byte range.
///
/// The first candidate with minutes or a meridiem decides; if its values
/// are out of range there is no time.
fn find_time(text: &str) -> Option<(Option<NaiveTime>, usize, usize)> {
    TIME_RE.captures_iter(text).find_map(|caps| {
        if caps.name("m").is_none() && caps.name("ampm").is_none() {
            return None;
        }
        let whole = caps.get(0)?;
        Some((time_from_captures(&caps), whole.start(), whole.end()))
    })
}

fn time_from_captures(caps: &Captures<'_>) -> Option<NaiveTime> {
    let hour: u32 = caps.name("h")?.as_str().parse().ok()?;
    let minute: u32 = match caps.name("m") {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    if minute > 59 {
        return None;
    }

    // Only a PM hour other than 12 is shifted; AM hours stand as written
    let hour = match caps.name("ampm").map(|m| m.as_str().to_ascii_lowercase()) {
        Some(meridiem) if meridiem == "pm" && hour != 12 => hour + 12,
        _ => hour,
    };
    if hour > 23 {
        return None;
    }

    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn parse_date(text: &str, anchor: NaiveDate, policy: YearPolicy) -> Option<NaiveDate> {
    let cleaned = text.replace(',', " ");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = TRAILING_CONNECTIVE_RE.replace(&cleaned, "");
    let cleaned = LEADING_CONNECTIVE_RE.replace(&cleaned, "");

    let caps = DATE_RE.captures(cleaned.trim())?;
    let day: u32 = caps.name("day")?.as_str().parse().ok()?;
    let month = month_number(caps.name("month")?.as_str())?;

    let year = match caps.name("year") {
        Some(year) => year.as_str().parse().ok()?,
        None => inferred_year(anchor, month, day, policy),
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Year for a yearless day/month. The comparison with the anchor is by
/// (month, day), so a 29 February rolls to the next year before the
/// calendar decides whether it exists.
fn inferred_year(anchor: NaiveDate, month: u32, day: u32, policy: YearPolicy) -> i32 {
    let before_anchor = (month, day) < (anchor.month(), anchor.day());
    match policy {
        YearPolicy::RollForward if before_anchor => anchor.year() + 1,
        _ => anchor.year(),
    }
}
