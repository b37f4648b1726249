//! Plain-text views printed by the CLI.
use chrono::{DateTime, Duration, TimeZone};
use std::fmt::Display;

use crate::calendar::{DayGroup, Range};
use crate::dates::{fmt_day, fmt_due};
use crate::todos::Todo;
use crate::workload::WeekBucket;

pub const NO_RANGE_ITEMS: &str = "No assignments in this range";
pub const NO_WORKLOAD: &str = "No workload data available.";
pub const NO_TODOS: &str = "No todos yet. Add your first task.";

const BAR_GLYPHS: &[char] = &['█', '▓', '▒', '░', '#', '=', '+', '*'];

// ─── Stats ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub courses:        i64,
    pub assignments:    i64,
    pub upcoming:       i64,
    pub scheduled_jobs: i64,
}

pub fn render_stats(s: &Stats) -> String {
    format!(
        "Courses {:>4}   Assignments {:>4}   Upcoming Deadlines {:>4}   Scheduled Jobs {:>4}",
        s.courses, s.assignments, s.upcoming, s.scheduled_jobs,
    )
}

// ─── Calendar ─────────────────────────────────────────────────────────────────

pub fn render_calendar<Tz>(groups: &[DayGroup], range: Range, from: &DateTime<Tz>, to: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tz = from.timezone();
    // `to` is exclusive; show the last day actually covered.
    let last = (to.clone() - Duration::milliseconds(1)).date_naive();
    let mut out = format!(
        "{} · {} – {}\n",
        range.label(), fmt_day(from.date_naive()), fmt_day(last),
    );

    if groups.is_empty() {
        out.push_str(&format!("  {NO_RANGE_ITEMS}\n"));
        return out;
    }

    for g in groups {
        out.push_str(&format!("\n{} {}\n", g.day.format("%a"), fmt_day(g.day)));
        for a in &g.items {
            let due = fmt_due(a.due_at.as_deref(), &tz);
            out.push_str(&format!(
                "  • {:<36} {:<24} Course {}\n",
                truncate(a.name.as_deref().unwrap_or("Assignment"), 36),
                if due.is_empty() { "No due date".to_owned() } else { due },
                a.course_id,
            ));
        }
    }
    out
}

// ─── Workload ─────────────────────────────────────────────────────────────────

/// Stacked text bars, one row per week. Each course gets a glyph from the
/// legend order, so colours stay stable between refreshes.
pub fn render_workload(buckets: &[WeekBucket], legend: &[i64]) -> String {
    if legend.is_empty() {
        return format!("{NO_WORKLOAD}\n");
    }

    let glyph = |course: i64| {
        let idx = legend.iter().position(|c| *c == course).unwrap_or(0);
        BAR_GLYPHS[idx % BAR_GLYPHS.len()]
    };

    let mut out = String::from("Legend:");
    for c in legend {
        out.push_str(&format!("  {} Course {}", glyph(*c), c));
    }
    out.push('\n');

    for b in buckets {
        let bar: String = legend.iter()
            .flat_map(|c| {
                let n = b.totals.get(c).copied().unwrap_or(0);
                std::iter::repeat(glyph(*c)).take(n)
            })
            .collect();
        out.push_str(&format!("{:<9} │{:<20} {}\n", b.week.replace("-W", " W"), bar, b.total()));
    }
    out
}

// ─── Checklist ────────────────────────────────────────────────────────────────

pub fn render_todos(items: &[Todo]) -> String {
    if items.is_empty() {
        return format!("{NO_TODOS}\n");
    }
    items.iter()
        .map(|t| format!(
            "[{}] {}  {}\n",
            if t.done { 'x' } else { ' ' },
            short_id(&t.id),
            t.title,
        ))
        .collect()
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_owned();
    }
    let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
    t.push('…');
    t
}
