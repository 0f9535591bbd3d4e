//! Wire formats for dates, times and durations.
//!
//! - date-time: RFC 3339 (`2024-01-31T08:15:00Z`); ISO 8601 and offset-less
//!   values are accepted on read, the latter as UTC.
//! - date: `YYYY-MM-DD`
//! - time: `HH:MM:SS[.fraction]`
//! - duration: ISO 8601 (`P1DT2H3M4.5S`), years and months counted as 365
//!   and 30 days.

use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time};

use crate::error::{Result, SerializationError};

const NANOS_PER_SECOND: i64 = 1_000_000_000;

pub fn parse_date_time(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }
    if let Ok(value) = OffsetDateTime::parse(raw, &Iso8601::DEFAULT) {
        return Some(value);
    }
    PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            raw,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
    })
    .ok()
    .map(PrimitiveDateTime::assume_utc)
}

pub fn format_date_time(value: OffsetDateTime) -> Result<String> {
    value
        .format(&Rfc3339)
        .map_err(|e| SerializationError::format(format!("date-time {value}: {e}")))
}

pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}

pub fn format_date(value: Date) -> Result<String> {
    value
        .format(format_description!("[year]-[month]-[day]"))
        .map_err(|e| SerializationError::format(format!("date {value}: {e}")))
}

pub fn parse_time(raw: &str) -> Option<Time> {
    let raw = raw.trim();
    Time::parse(raw, format_description!("[hour]:[minute]:[second].[subsecond]"))
        .or_else(|_| Time::parse(raw, format_description!("[hour]:[minute]:[second]")))
        .or_else(|_| Time::parse(raw, format_description!("[hour]:[minute]")))
        .ok()
}

pub fn format_time(value: Time) -> Result<String> {
    let formatted = if value.nanosecond() == 0 {
        value.format(format_description!("[hour]:[minute]:[second]"))
    } else {
        value.format(format_description!("[hour]:[minute]:[second].[subsecond]"))
    };
    formatted.map_err(|e| SerializationError::format(format!("time {value}: {e}")))
}

pub fn format_duration(value: Duration) -> String {
    if value.is_zero() {
        return "PT0S".to_owned();
    }
    let mut out = String::new();
    if value.is_negative() {
        out.push('-');
    }
    let value = value.abs();
    out.push('P');

    let days = value.whole_days();
    let hours = value.whole_hours() % 24;
    let minutes = value.whole_minutes() % 60;
    let seconds = value.whole_seconds() % 60;
    let nanos = value.subsec_nanoseconds();

    if days > 0 {
        out.push_str(&format!("{days}D"));
    }
    if hours > 0 || minutes > 0 || seconds > 0 || nanos > 0 {
        out.push('T');
        if hours > 0 {
            out.push_str(&format!("{hours}H"));
        }
        if minutes > 0 {
            out.push_str(&format!("{minutes}M"));
        }
        if seconds > 0 || nanos > 0 {
            out.push_str(&seconds.to_string());
            if nanos > 0 {
                let fraction = format!("{nanos:09}");
                out.push('.');
                out.push_str(fraction.trim_end_matches('0'));
            }
            out.push('S');
        }
    }
    out
}

pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (negative, rest) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let rest = rest.strip_prefix(['P', 'p'])?;
    let (date_part, time_part) = match rest.find(|c: char| c == 'T' || c == 't') {
        Some(i) => (&rest[..i], Some(&rest[i + 1..])),
        None => (rest, None),
    };

    let mut total = Duration::ZERO;
    let mut seen = false;
    for (number, unit) in components(date_part)? {
        let days = match unit {
            'Y' => 365,
            'M' => 30,
            'W' => 7,
            'D' => 1,
            _ => return None,
        };
        let seconds = whole(number)?.checked_mul(days)?.checked_mul(86_400)?;
        total = total.checked_add(Duration::seconds(seconds))?;
        seen = true;
    }
    if let Some(time_part) = time_part {
        if time_part.is_empty() {
            return None;
        }
        for (number, unit) in components(time_part)? {
            let part = match unit {
                'H' => Duration::seconds(whole(number)?.checked_mul(3_600)?),
                'M' => Duration::seconds(whole(number)?.checked_mul(60)?),
                'S' => seconds_with_fraction(number)?,
                _ => return None,
            };
            total = total.checked_add(part)?;
            seen = true;
        }
    }
    if !seen {
        return None;
    }
    if negative {
        Duration::ZERO.checked_sub(total)
    } else {
        Some(total)
    }
}

fn components(part: &str) -> Option<Vec<(&str, char)>> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in part.char_indices() {
        if c.is_ascii_digit() || c == '.' || c == ',' {
            continue;
        }
        if i == start {
            return None;
        }
        out.push((&part[start..i], c.to_ascii_uppercase()));
        start = i + c.len_utf8();
    }
    if start != part.len() {
        return None;
    }
    Some(out)
}

/// Overflowing or fractional counts yield `None`.
fn whole(number: &str) -> Option<i64> {
    number.parse().ok()
}

fn seconds_with_fraction(number: &str) -> Option<Duration> {
    let (whole_part, fraction) = match number.split_once(['.', ',']) {
        Some((w, f)) => (w, f),
        None => (number, ""),
    };
    let seconds: i64 = if whole_part.is_empty() {
        0
    } else {
        whole_part.parse().ok()?
    };
    let mut nanos: i64 = 0;
    if !fraction.is_empty() {
        let digits: String = fraction.chars().take(9).collect();
        let scale = 10_i64.pow(9 - digits.len() as u32);
        nanos = digits.parse::<i64>().ok()? * scale;
    }
    Duration::seconds(seconds).checked_add(Duration::nanoseconds(nanos % NANOS_PER_SECOND))
}
