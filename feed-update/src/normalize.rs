//! Identity and timestamp normalization for fetched items.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use md5::{Digest, Md5};

use crate::types::Item;

/// Upstream wire format with a numeric offset (`Tue, 04 Jun 2024 10:00:00 +0000`).
/// Also the format of `pubDate` and `lastBuildDate` in the rendered feed.
pub const WIRE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

const DATE_TIME_FORMAT: &str = "%d %b %Y %H:%M:%S";

/// Trims every category and drops the empty ones.
pub fn clean_categories(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercase hex md5 of the trimmed value.
pub fn hash_string(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return format!("hash-{}", nanos(Utc::now()));
    }
    format!("{:x}", Md5::digest(value.as_bytes()))
}

/// Stable identity of an item fetched from `provider`.
pub fn entry_id(provider: &str, item: &Item) -> String {
    entry_id_at(provider, item, Utc::now())
}

/// Identity basis is the trimmed pub date, then the trimmed link. When both
/// are empty the basis is `provider-<nanos of now>`, which differs on every
/// run: an item without either field is re-added each time it is fetched.
pub fn entry_id_at(provider: &str, item: &Item, now: DateTime<Utc>) -> String {
    let mut basis = item.pub_date.trim().to_string();
    if basis.is_empty() {
        basis = item.link.trim().to_string();
    }
    if basis.is_empty() {
        basis = format!("{}-{}", provider, nanos(now));
    }
    hash_string(&format!("{}|{}", provider, basis))
}

/// Canonical `created_at` of an item; `now` when the pub date is unusable.
pub fn created_at(item: &Item, now: DateTime<Utc>) -> String {
    match parse_pub_date(&item.pub_date) {
        Some(parsed) => format_canonical(parsed.with_timezone(&Utc)),
        None => format_canonical(now),
    }
}

/// Parses an upstream pub date. Accepts the numeric offset form first, then
/// RFC 2822 named zones (`GMT`, `EST`, ...). Any other trailing zone name is
/// read as UTC. A weekday that disagrees with the date is ignored.
pub fn parse_pub_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_str(value, WIRE_FORMAT) {
        return Some(parsed);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Some(parsed);
    }

    let body = strip_weekday(value);
    if let Ok(parsed) = DateTime::parse_from_rfc2822(body) {
        return Some(parsed);
    }

    let (rest, zone) = body.rsplit_once(' ')?;
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(rest.trim_end(), DATE_TIME_FORMAT).ok()?;
    Some(FixedOffset::east_opt(0)?.from_utc_datetime(&naive))
}

/// `Tue, 04 Jun 2024 ...` without the `Tue, ` prefix.
fn strip_weekday(value: &str) -> &str {
    match value.split_once(',') {
        Some((day, rest)) if day.len() == 3 && day.chars().all(|c| c.is_ascii_alphabetic()) => rest.trim_start(),
        _ => value,
    }
}

/// Parses a stored `created_at`.
pub fn parse_canonical(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value.trim()).ok()
}

/// Second precision UTC with a `Z` suffix, so string order is time order.
pub fn format_canonical(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn format_wire(value: DateTime<Utc>) -> String {
    value.format(WIRE_FORMAT).to_string()
}

fn nanos(now: DateTime<Utc>) -> i64 {
    now.timestamp_nanos_opt().unwrap_or_default()
}
