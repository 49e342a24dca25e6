//! Datapoint timestamp extraction
//!
//! The alarm reason carries the evaluated datapoint as free text, e.g.
//! `Threshold Crossed: 1 datapoint [2.0 (04/08/25 05:16:00)] was greater than ...`.
//! The first `(DD/MM/YY HH:MM:SS)` group is the evaluation timestamp (UTC).

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;
use tracing::debug;

static DATAPOINT_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn datapoint_regex() -> Option<&'static Regex> {
    DATAPOINT_PATTERN
        .get_or_init(|| Regex::new(r"\((\d{2})/(\d{2})/(\d{2}) (\d{2}:\d{2}:\d{2})\)").ok())
        .as_ref()
}

/// Two-digit years up to 50 are 20xx, the rest 19xx.
fn full_year(two_digit: u32) -> i32 {
    if two_digit <= 50 {
        2000 + two_digit as i32
    } else {
        1900 + two_digit as i32
    }
}

/// Extract the datapoint instant from an alarm reason.
///
/// Only the first parenthesized group matching the pattern is considered. Returns
/// `None` when nothing matches or the match is not a valid calendar date/time;
/// older alarms carry no datapoint and callers fall back to a recent search.
pub fn extract(reason_text: &str) -> Option<DateTime<Utc>> {
    let captures = datapoint_regex()?.captures(reason_text)?;

    let day: u32 = captures[1].parse().ok()?;
    let month: u32 = captures[2].parse().ok()?;
    let year = full_year(captures[3].parse().ok()?);

    let date = NaiveDate::from_ymd_opt(year, month, day);
    let time = NaiveTime::parse_from_str(&captures[4], "%H:%M:%S").ok();

    match (date, time) {
        (Some(date), Some(time)) => Some(NaiveDateTime::new(date, time).and_utc()),
        _ => {
            debug!(matched = %&captures[0], "Datapoint timestamp is not a valid date");
            None
        }
    }
}

/// ISO-8601 form of [`extract`] with millisecond precision, e.g.
/// `2025-08-04T05:16:00.000Z`.
pub fn extract_iso(reason_text: &str) -> Option<String> {
    extract(reason_text).map(|instant| instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}
