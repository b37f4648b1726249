use anyhow::{anyhow, Error};
use chrono::{DateTime, NaiveDate, TimeZone};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::dates::{add_days, end_of_month, start_of_day, within};
use crate::models::Assignment;

// ─── Range selector ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Range {
    Day,
    ThreeDay,
    #[default]
    SevenDay,
    Month,
}

impl Range {
    pub const ALL: [Range; 4] = [Range::Day, Range::ThreeDay, Range::SevenDay, Range::Month];

    pub fn key(self) -> &'static str {
        match self {
            Range::Day      => "day",
            Range::ThreeDay => "3d",
            Range::SevenDay => "7d",
            Range::Month    => "month",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Range::Day      => "Day",
            Range::ThreeDay => "3-Day",
            Range::SevenDay => "7-Day",
            Range::Month    => "Month",
        }
    }

    /// Fixed length in days; `None` for the rest of the current month.
    pub fn days(self) -> Option<i64> {
        match self {
            Range::Day      => Some(1),
            Range::ThreeDay => Some(3),
            Range::SevenDay => Some(7),
            Range::Month    => None,
        }
    }

    /// The `[from, to)` window anchored at the start of `today`.
    pub fn window<Tz: TimeZone>(self, today: &DateTime<Tz>) -> (DateTime<Tz>, DateTime<Tz>) {
        let from = start_of_day(today);
        let to = match self.days() {
            Some(n) => add_days(&from, n),
            None    => end_of_month(&from),
        };
        (from, to)
    }
}

impl FromStr for Range {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "1d"            => Ok(Range::Day),
            "3d" | "3-day" | "3day" => Ok(Range::ThreeDay),
            "7d" | "7-day" | "7day" | "week" => Ok(Range::SevenDay),
            "month"                 => Ok(Range::Month),
            other => {
                let keys: Vec<_> = Range::ALL.iter().map(|r| r.key()).collect();
                Err(anyhow!("unknown range '{other}' (expected one of {})", keys.join(", ")))
            }
        }
    }
}

// ─── Day groups ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup {
    pub day:   NaiveDate,
    /// `YYYY-MM-DD`
    pub key:   String,
    pub items: Vec<Assignment>,
}

/// Assignments due inside `range` (anchored at `today`), grouped by local
/// calendar day. Groups ascend by day; items keep their input order.
pub fn bucket<Tz: TimeZone>(
    assignments: &[Assignment],
    range:       Range,
    today:       &DateTime<Tz>,
) -> Vec<DayGroup> {
    let (from, to) = range.window(today);
    let tz = today.timezone();

    let mut days: BTreeMap<NaiveDate, Vec<Assignment>> = BTreeMap::new();
    for a in assignments {
        let Some(due) = a.due() else { continue };
        if !within(&due, &from, &to) { continue; }
        days.entry(due.with_timezone(&tz).date_naive())
            .or_default()
            .push(a.clone());
    }

    tracing::debug!(
        range = range.key(), groups = days.len(),
        "bucketed {} assignments", assignments.len()
    );

    days.into_iter()
        .map(|(day, items)| DayGroup { key: day.format("%Y-%m-%d").to_string(), day, items })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, SecondsFormat, Utc};
    use chrono_tz::America::New_York;

    fn assignment(course_id: i64, assignment_id: i64, due_at: Option<String>) -> Assignment {
        Assignment { course_id, assignment_id, name: None, due_at, html_url: None, }
    }

    fn iso<Tz: TimeZone>(t: DateTime<Tz>) -> String {
        t.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn today() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).single().expect("valid today")
    }

    #[test]
    fn seven_day_range_keeps_only_assignments_inside_the_week() {
        let t = today();
        let list = vec![
            assignment(1, 10, Some(iso(t + Duration::days(2)))),
            assignment(2, 11, Some(iso(t + Duration::days(10)))),
        ];
        let groups = bucket(&list, Range::SevenDay, &t);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "2026-10-18");
        assert_eq!(groups[0].items.iter().map(|a| a.assignment_id).collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn groups_ascend_and_keep_input_order_within_a_day() {
        let t = today();
        let list = vec![
            assignment(1, 1, Some("2026-10-18T20:00:00Z".into())),
            assignment(1, 2, Some("2026-10-16T12:00:00Z".into())),
            assignment(2, 3, Some("2026-10-18T08:00:00Z".into())),
            assignment(2, 4, Some("2026-10-17T00:00:00Z".into())),
        ];
        let groups = bucket(&list, Range::SevenDay, &t);
        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["2026-10-16", "2026-10-17", "2026-10-18"]);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));

        let last: Vec<_> = groups[2].items.iter().map(|a| a.assignment_id).collect();
        assert_eq!(last, vec![1, 3]);
    }

    #[test]
    fn window_end_is_exclusive_and_start_inclusive() {
        let t = today();
        let list = vec![
            assignment(1, 1, Some("2026-10-16T00:00:00Z".into())),
            assignment(1, 2, Some("2026-10-17T00:00:00Z".into())),
            assignment(1, 3, Some("2026-10-15T23:59:59Z".into())),
        ];
        let groups = bucket(&list, Range::Day, &t);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].items[0].assignment_id, 1);
    }

    #[test]
    fn missing_and_malformed_due_dates_are_dropped() {
        let t = today();
        let list = vec![
            assignment(1, 1, None),
            assignment(1, 2, Some("tomorrow-ish".into())),
            assignment(1, 3, Some("2026-10-17T10:00:00Z".into())),
        ];
        let kept: Vec<_> = bucket(&list, Range::ThreeDay, &t)
            .into_iter().flat_map(|g| g.items).map(|a| a.assignment_id).collect();
        assert_eq!(kept, vec![3]);
    }

    #[test]
    fn month_range_runs_to_the_end_of_the_month() {
        let t = today();
        let list = vec![
            assignment(1, 1, Some("2026-10-31T23:00:00Z".into())),
            assignment(1, 2, Some("2026-11-01T00:00:00Z".into())),
        ];
        let groups = bucket(&list, Range::Month, &t);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "2026-10-31");
    }

    #[test]
    fn today_is_truncated_to_midnight() {
        let afternoon = Utc.with_ymd_and_hms(2026, 10, 16, 15, 0, 0).single().expect("valid");
        let morning = vec![assignment(1, 1, Some("2026-10-16T09:00:00Z".into()))];
        assert_eq!(bucket(&morning, Range::Day, &afternoon).len(), 1);
    }

    #[test]
    fn day_keys_follow_the_reference_zone() {
        // 02:00Z on the 17th is still the evening of the 16th in New York.
        let t = New_York.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).single().expect("valid");
        let list = vec![assignment(1, 1, Some("2026-10-17T02:00:00Z".into()))];
        let groups = bucket(&list, Range::Day, &t);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "2026-10-16");
    }

    #[test]
    fn every_kept_item_lies_inside_the_window() {
        let t = today();
        let list: Vec<_> = (0..40)
            .map(|i| assignment(i % 3, i, Some(iso(t - Duration::hours(30) + Duration::hours(i * 7)))))
            .collect();
        for range in Range::ALL {
            let (from, to) = range.window(&t);
            let groups = bucket(&list, range, &t);
            let kept: Vec<_> = groups.iter().flat_map(|g| g.items.iter()).collect();
            for a in &kept {
                assert!(within(&a.due().expect("due"), &from, &to));
            }
            let dropped = list.iter().filter(|a| !kept.contains(a));
            for a in dropped {
                assert!(!within(&a.due().expect("due"), &from, &to));
            }
        }
    }

    #[test]
    fn parses_range_names() {
        assert_eq!("day".parse::<Range>().expect("day"), Range::Day);
        assert_eq!("3-day".parse::<Range>().expect("3-day"), Range::ThreeDay);
        assert_eq!("7D".parse::<Range>().expect("7D"), Range::SevenDay);
        assert_eq!("month".parse::<Range>().expect("month"), Range::Month);
        assert!("fortnight".parse::<Range>().is_err());
        assert_eq!(Range::default(), Range::SevenDay);
    }
}
