//! Date parsing and pattern formatting for the `date` filter
//!
//! Time zones are always explicit: text without an offset is read in the zone
//! passed by the caller, or UTC. Only fixed offsets are understood.
//!
//! Pattern letters follow the widespread `Y-m-d H:i:s` convention:
//!
//! | letter | output |
//! |---|---|
//! | `d` `j` | day of month, padded / unpadded |
//! | `D` `l` | weekday name, short / full |
//! | `N` `w` | ISO weekday 1-7 / weekday 0-6 from Sunday |
//! | `S` | English ordinal suffix of the day |
//! | `z` | day of year from 0 |
//! | `W` `o` | ISO week number / ISO week-numbering year |
//! | `F` `M` | month name, full / short |
//! | `m` `n` | month, padded / unpadded |
//! | `t` `L` | days in month / leap year flag |
//! | `Y` `y` | year, four / two digits |
//! | `a` `A` | am/pm, lower / upper case |
//! | `g` `G` `h` `H` | hour, 12h/24h unpadded, 12h/24h padded |
//! | `i` `s` | minutes, seconds |
//! | `u` `v` | microseconds, milliseconds |
//! | `e` `T` | zone name (`UTC` or the offset) |
//! | `I` | daylight saving flag (always 0) |
//! | `O` `P` `p` | offset `+0100`, `+01:00`, `Z` or `+01:00` |
//! | `Z` | offset in seconds |
//! | `c` `r` `U` | ISO 8601, RFC 2822, Unix seconds |
//!
//! A backslash prints the following character literally; any other character
//! is copied as is.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use std::fmt::Write;

/// Pattern used when the filter gets no format argument
pub const DEFAULT_FORMAT: &str = "Y-m-d H:i:s";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %:z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Parse a time zone argument: `UTC`, `Z`, `GMT`, `+HH:MM`, `+HHMM` or `+HH`
pub fn parse_timezone(text: &str) -> Option<FixedOffset> {
    let text = text.trim();
    if ["UTC", "Z", "GMT"].iter().any(|name| text.eq_ignore_ascii_case(name)) {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    if !rest.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return None;
    }

    let (hours, minutes) = match (rest.len(), rest.split_once(':')) {
        (5, Some((h, m))) if h.len() == 2 => (h, m),
        (4, None) => rest.split_at(2),
        (2, None) => (rest, "00"),
        _ => return None,
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parse text into an absolute instant
///
/// Text carrying its own offset keeps it; naive text is placed in `zone`,
/// defaulting to UTC.
pub fn parse_datetime(text: &str, zone: Option<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(seconds) = text.strip_prefix('@') {
        let seconds: i64 = seconds.parse().ok()?;
        return Utc.timestamp_opt(seconds, 0).single().map(|dt| dt.fixed_offset());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt);
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    let zone = match zone {
        Some(zone) => zone,
        None => FixedOffset::east_opt(0)?,
    };
    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    naive.and_local_timezone(zone).single()
}

/// Render `dt` using the pattern letters listed in the module documentation
pub fn format_datetime(dt: &DateTime<FixedOffset>, pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(literal) = chars.next() {
                out.push(literal);
            }
            continue;
        }
        write_letter(&mut out, dt, c).ok();
    }
    out
}

fn write_letter(out: &mut String, dt: &DateTime<FixedOffset>, letter: char) -> std::fmt::Result {
    let offset = dt.offset().local_minus_utc();
    match letter {
        'd' => write!(out, "{:02}", dt.day()),
        'D' => write!(out, "{}", dt.format("%a")),
        'j' => write!(out, "{}", dt.day()),
        'l' => write!(out, "{}", dt.format("%A")),
        'N' => write!(out, "{}", dt.weekday().number_from_monday()),
        'S' => out.write_str(ordinal_suffix(dt.day())),
        'w' => write!(out, "{}", dt.weekday().num_days_from_sunday()),
        'z' => write!(out, "{}", dt.ordinal0()),
        'W' => write!(out, "{:02}", dt.iso_week().week()),
        'F' => write!(out, "{}", dt.format("%B")),
        'm' => write!(out, "{:02}", dt.month()),
        'M' => write!(out, "{}", dt.format("%b")),
        'n' => write!(out, "{}", dt.month()),
        't' => write!(out, "{}", days_in_month(dt.year(), dt.month())),
        'L' => write!(out, "{}", u8::from(is_leap_year(dt.year()))),
        'o' => write!(out, "{}", dt.iso_week().year()),
        'Y' => write!(out, "{:04}", dt.year()),
        'y' => write!(out, "{:02}", dt.year().rem_euclid(100)),
        'a' => out.write_str(if dt.hour() < 12 { "am" } else { "pm" }),
        'A' => out.write_str(if dt.hour() < 12 { "AM" } else { "PM" }),
        'g' => write!(out, "{}", dt.hour12().1),
        'G' => write!(out, "{}", dt.hour()),
        'h' => write!(out, "{:02}", dt.hour12().1),
        'H' => write!(out, "{:02}", dt.hour()),
        'i' => write!(out, "{:02}", dt.minute()),
        's' => write!(out, "{:02}", dt.second()),
        'u' => write!(out, "{:06}", dt.timestamp_subsec_micros()),
        'v' => write!(out, "{:03}", dt.timestamp_subsec_millis()),
        'e' | 'T' => {
            if offset == 0 {
                out.write_str("UTC")
            } else {
                write_offset(out, offset, true)
            }
        }
        'I' => out.write_char('0'),
        'O' => write_offset(out, offset, false),
        'P' => write_offset(out, offset, true),
        'p' => {
            if offset == 0 {
                out.write_char('Z')
            } else {
                write_offset(out, offset, true)
            }
        }
        'Z' => write!(out, "{}", offset),
        'c' => {
            out.push_str(&format_datetime(dt, "Y-m-d\\TH:i:s"));
            write_offset(out, offset, true)
        }
        'r' => {
            out.push_str(&format_datetime(dt, "D, d M Y H:i:s "));
            write_offset(out, offset, false)
        }
        'U' => write!(out, "{}", dt.timestamp()),
        other => out.write_char(other),
    }
}

fn write_offset(out: &mut String, offset_seconds: i32, colon: bool) -> std::fmt::Result {
    let sign = if offset_seconds < 0 { '-' } else { '+' };
    let total_minutes = offset_seconds.unsigned_abs() / 60;
    let (hours, minutes) = (total_minutes / 60, total_minutes % 60);
    if colon {
        write!(out, "{}{:02}:{:02}", sign, hours, minutes)
    } else {
        write!(out, "{}{:02}{:02}", sign, hours, minutes)
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}
