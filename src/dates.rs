//! Date helpers shared by the calendar, workload and digest views.
//!
//! Every function takes its reference time zone from the `DateTime<Tz>` it is
//! given, so callers (and tests) pin the zone explicitly instead of relying on
//! the process environment.
use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use std::fmt::Display;

// ─── Parsing ──────────────────────────────────────────────────────────────────

/// Parse a backend `due_at` value. RFC 3339 with any offset is accepted; a
/// naive `YYYY-MM-DDTHH:MM:SS[.fff]` is read as UTC.
pub fn parse_due(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|n| n.and_utc())
}

// ─── Day arithmetic ───────────────────────────────────────────────────────────

/// Local midnight of `t`'s calendar day.
pub fn start_of_day<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    resolve_local(&t.timezone(), t.date_naive().and_time(NaiveTime::MIN))
}

pub fn start_of_today<Tz: TimeZone>(tz: &Tz) -> DateTime<Tz> {
    start_of_day(&Utc::now().with_timezone(tz))
}

/// Same local wall-clock time `n` calendar days later (or earlier).
pub fn add_days<Tz: TimeZone>(t: &DateTime<Tz>, n: i64) -> DateTime<Tz> {
    resolve_local(&t.timezone(), t.naive_local() + Duration::days(n))
}

/// Last millisecond of `t`'s month, 23:59:59.999 on the final day.
pub fn end_of_month<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    let date = t.date_naive();
    let last = NaiveDate::from_ymd_opt(
        date.year(), date.month(), days_in_month(date.year(), date.month()),
    ).unwrap_or(date);
    let naive = last
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| last.and_time(NaiveTime::MIN));
    resolve_local(&t.timezone(), naive)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(f), Some(n)) => (n - f).num_days() as u32,
        _                  => 0,
    }
}

/// Map a local wall time to an instant. Ambiguous times take the earlier
/// instant; times inside a DST gap move forward past the gap.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    if let Some(t) = tz.from_local_datetime(&naive).earliest() {
        return t;
    }
    (1..=3)
        .find_map(|h| tz.from_local_datetime(&(naive + Duration::hours(h))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

// ─── Range checks ─────────────────────────────────────────────────────────────

/// Half-open `[from, to)` membership.
pub fn within<Tz: TimeZone>(due: &DateTime<Utc>, from: &DateTime<Tz>, to: &DateTime<Tz>) -> bool {
    *due >= from.with_timezone(&Utc) && *due < to.with_timezone(&Utc)
}

// ─── Display ──────────────────────────────────────────────────────────────────

/// `Fri, Oct 16, 11:59 PM` in `tz`; empty for missing or malformed input.
pub fn fmt_due<Tz>(due_at: Option<&str>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match due_at.and_then(parse_due) {
        Some(d) => d.with_timezone(tz).format("%a, %b %-d, %I:%M %p").to_string(),
        None    => String::new(),
    }
}

pub fn fmt_day(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}
