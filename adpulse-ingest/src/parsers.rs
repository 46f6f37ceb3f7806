//! Field coercion for raw CSV cells
//!
//! Numeric parsers never fail: anything unusable becomes the caller's
//! default. Dates are the only mandatory field and report a [`DateError`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::DateError;

/// Explicit date layouts, tried in order before the ISO fallback.
///
/// Slash dates are always month-first: "01/02/2024" is January 2.
pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// ISO-8601 week dates, extended (`2024-W01-1`) and basic (`2024W011`)
const ISO_WEEK_FORMATS: [&str; 2] = ["%G-W%V-%u", "%GW%V%u"];

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Integer via float coercion, truncating toward zero ("12.9" → 12)
pub fn parse_int(value: Option<&str>, default: i64) -> i64 {
    match non_empty(value).and_then(|v| v.parse::<f64>().ok()) {
        Some(parsed) if parsed.is_finite() => parsed.trunc() as i64,
        _ => default,
    }
}

pub fn parse_float(value: Option<&str>, default: f64) -> f64 {
    match non_empty(value).and_then(|v| v.parse::<f64>().ok()) {
        Some(parsed) if parsed.is_finite() => parsed,
        _ => default,
    }
}

/// Currency amount such as "$1,234.50"
pub fn parse_money(value: Option<&str>, default: f64) -> f64 {
    match value {
        Some(raw) => {
            let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
            parse_float(Some(&cleaned), default)
        }
        None => default,
    }
}

pub fn parse_date(value: Option<&str>) -> Result<NaiveDate, DateError> {
    let raw = non_empty(value).ok_or(DateError::Missing)?;

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date);
        }
    }

    parse_iso_fallback(raw).ok_or_else(|| DateError::Invalid(raw.to_string()))
}

/// Basic `YYYYMMDD`, an ISO week date, or the date part of an ISO-8601 /
/// RFC 3339 timestamp
///
/// Timestamps are reduced to their date here, unlike a strict ISO date
/// parser which rejects them. Keep it that way.
fn parse_iso_fallback(raw: &str) -> Option<NaiveDate> {
    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        let year = raw[0..4].parse().ok()?;
        let month = raw[4..6].parse().ok()?;
        let day = raw[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(date) = parse_iso_week(raw) {
        return Some(date);
    }

    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|stamp| stamp.date())
}

/// Week dates; a week without a weekday (`2024-W01`, `2024W01`) is its Monday
fn parse_iso_week(raw: &str) -> Option<NaiveDate> {
    if !raw.contains('W') {
        return None;
    }
    let monday = if raw.contains("-W") {
        format!("{}-1", raw)
    } else {
        format!("{}1", raw)
    };

    let parsed = [raw, monday.as_str()].into_iter().find_map(|candidate| {
        ISO_WEEK_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(candidate, format).ok())
    });
    parsed
}
