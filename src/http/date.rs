//! HTTP date handling for the `Date` header and conditional requests.
//!
//! Three historical date formats are accepted, told apart by the first
//! token:
//!
//! - `Sun, 06 Nov 1994 08:49:37 GMT` (RFC 1123)
//! - `Sunday, 06-Nov-94 08:49:37 GMT` (RFC 850, two-digit year)
//! - `Sun Nov  6 08:49:37 1994` (asctime)
//!
//! RFC 850 years are shifted into the 2000s; a year resolving past 2050
//! is treated as far future, which always satisfies a modified-since
//! check. Comparison happens at whole-second precision because none of
//! the wire formats carry anything finer.

use std::time::SystemTime;

use chrono::{DateTime, TimeZone, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpDate {
    Instant(DateTime<Utc>),
    /// RFC 850 date beyond the rollover window.
    FarFuture,
}

/// Parses one of the three accepted formats. `None` means the value is not
/// a usable date and the header carrying it should be ignored.
pub fn parse_http_date(value: &str) -> Option<HttpDate> {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    let first = tokens.first()?;

    if first.as_bytes().get(3) == Some(&b',') {
        // Sun, 06 Nov 1994 08:49:37 GMT
        if tokens.len() < 5 {
            return None;
        }
        let day: u32 = tokens[1].parse().ok()?;
        let month = month_number(tokens[2])?;
        let year: i32 = tokens[3].parse().ok()?;
        let (hour, min, sec) = clock(tokens[4])?;
        instant(year, month, day, hour, min, sec)
    } else if first.len() > 3 {
        // Sunday, 06-Nov-94 08:49:37 GMT
        if tokens.len() < 3 {
            return None;
        }
        let mut date = tokens[1].split('-');
        let day: u32 = date.next()?.parse().ok()?;
        let month = month_number(date.next()?)?;
        let year: i32 = date.next()?.parse::<i32>().ok()? + 2000;
        if year > 2050 {
            return Some(HttpDate::FarFuture);
        }
        let (hour, min, sec) = clock(tokens[2])?;
        instant(year, month, day, hour, min, sec)
    } else {
        // Sun Nov  6 08:49:37 1994
        if tokens.len() < 5 {
            return None;
        }
        let month = month_number(tokens[1])?;
        let day: u32 = tokens[2].parse().ok()?;
        let (hour, min, sec) = clock(tokens[3])?;
        let year: i32 = tokens[4].parse().ok()?;
        instant(year, month, day, hour, min, sec)
    }
}

/// RFC 1123 formatted date, as sent in the `Date` response header.
pub fn format_http_date(t: SystemTime) -> String {
    let datetime = DateTime::<Utc>::from(t);
    datetime.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Whether the file changed after the instant in the header value.
/// `None` when the header value does not parse as a date.
pub fn modified_since(header: &str, mtime: SystemTime) -> Option<bool> {
    match parse_http_date(header)? {
        HttpDate::FarFuture => Some(true),
        HttpDate::Instant(limit) => {
            let mtime = DateTime::<Utc>::from(mtime);
            Some(mtime.timestamp() > limit.timestamp())
        }
    }
}

/// Logical negation of [`modified_since`] for the same pair.
pub fn unmodified_since(header: &str, mtime: SystemTime) -> Option<bool> {
    modified_since(header, mtime).map(|modified| !modified)
}

fn instant(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<HttpDate> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
        .map(HttpDate::Instant)
}

fn clock(value: &str) -> Option<(u32, u32, u32)> {
    let mut parts = value.split(':');
    let hour = parts.next()?.parse().ok()?;
    let min = parts.next()?.parse().ok()?;
    let sec = parts.next()?.parse().ok()?;
    Some((hour, min, sec))
}

fn month_number(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i as u32 + 1)
}
