//! Per-course assignment counts for the next eight ISO weeks.
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use std::collections::{BTreeMap, BTreeSet};

use crate::dates::add_days;
use crate::models::Assignment;

/// Number of weeks on the chart's x-axis.
pub const WEEKS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekBucket {
    /// `YYYY-Www`
    pub week:   String,
    pub totals: BTreeMap<i64, usize>,
}

impl WeekBucket {
    pub fn total(&self) -> usize { self.totals.values().sum() }
}

/// ISO-8601 week label for `date`.
///
/// The date is moved to the Thursday of its Monday-based week; that Thursday's
/// year is the ISO year, and its day-of-year gives the week number.
pub fn iso_week_key(date: NaiveDate) -> String {
    let day_num  = date.weekday().number_from_monday() as i64;
    let thursday = date + Duration::days(4 - day_num);
    let week     = (thursday.ordinal0() + 7) / 7;
    format!("{}-W{:02}", thursday.year(), week)
}

/// Eight consecutive week buckets, the first containing `now`. Weeks with no
/// assignments are still present so the axis stays stable.
pub fn aggregate<Tz: TimeZone>(assignments: &[Assignment], now: &DateTime<Tz>) -> Vec<WeekBucket> {
    let tz = now.timezone();
    let mut buckets: Vec<WeekBucket> = (0..WEEKS as i64)
        .map(|i| WeekBucket {
            week:   iso_week_key(add_days(now, i * 7).date_naive()),
            totals: BTreeMap::new(),
        })
        .collect();

    for a in assignments {
        let Some(due) = a.due() else { continue };
        let key = iso_week_key(due.with_timezone(&tz).date_naive());
        if let Some(b) = buckets.iter_mut().find(|b| b.week == key) {
            *b.totals.entry(a.course_id).or_insert(0) += 1;
        }
    }

    tracing::debug!(
        first = %buckets[0].week, counted = window_total(&buckets),
        "aggregated workload"
    );
    buckets
}

/// Distinct course ids across all input, ascending.
pub fn course_legend(assignments: &[Assignment]) -> Vec<i64> {
    assignments.iter()
        .map(|a| a.course_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn window_total(buckets: &[WeekBucket]) -> usize {
    buckets.iter().map(WeekBucket::total).sum()
}
