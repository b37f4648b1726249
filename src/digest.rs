//! Static HTML "weekly digest" of upcoming assignments and open todos.
use chrono::{DateTime, Duration, TimeZone, Utc};
use maud::{html, Markup, DOCTYPE};
use std::fmt::Display;

use crate::dates::fmt_due;
use crate::models::Assignment;
use crate::todos::Todo;

pub const NO_ASSIGNMENTS: &str = "No assignments due this week.";
pub const NO_TODOS: &str = "No open todos.";

/// Assignments due no later than seven days after `now`, earliest first.
/// Overdue work is included; equal due times keep their input order.
pub fn upcoming<Tz: TimeZone>(assignments: &[Assignment], now: &DateTime<Tz>) -> Vec<Assignment> {
    let horizon = now.with_timezone(&Utc) + Duration::days(7);
    let mut due: Vec<(DateTime<Utc>, &Assignment)> = assignments.iter()
        .filter_map(|a| a.due().map(|d| (d, a)))
        .filter(|(d, _)| *d <= horizon)
        .collect();
    due.sort_by_key(|(d, _)| *d);
    due.into_iter().map(|(_, a)| a.clone()).collect()
}

pub fn build_digest<Tz>(assignments: &[Assignment], todos: &[Todo], now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tz = now.timezone();
    let upcoming = upcoming(assignments, now);
    let open: Vec<&Todo> = todos.iter().filter(|t| !t.done).collect();

    tracing::debug!(upcoming = upcoming.len(), todos = open.len(), "built digest");

    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "Weekly Digest" }
            }
            body style="font-family:ui-sans-serif,system-ui;line-height:1.4;padding:16px;background:#0b0b0c;color:#e5e7eb" {
                h1 style="font-size:20px;margin:0 0 8px" { "Your Weekly Digest" }
                p style="color:#9ca3af;margin:0 0 16px" { "Here’s what’s coming up this week." }
                h2 style="font-size:16px;margin:16px 0 8px" { "Upcoming Assignments" }
                @if upcoming.is_empty() {
                    div style=(MUTED) { (NO_ASSIGNMENTS) }
                } @else {
                    ul {
                        @for a in &upcoming {
                            (render_assignment(a, &tz))
                        }
                    }
                }
                h2 style="font-size:16px;margin:16px 0 8px" { "Todo" }
                @if open.is_empty() {
                    div style=(MUTED) { (NO_TODOS) }
                } @else {
                    ul {
                        @for t in &open {
                            li { (t.title) }
                        }
                    }
                }
            }
        }
    }
    .into_string()
}

const MUTED: &str = "color:#9ca3af";

fn render_assignment<Tz>(a: &Assignment, tz: &Tz) -> Markup
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    html! {
        li {
            strong { (a.display_name()) }
            @if let Some(url) = &a.html_url {
                " - " a href=(url) { "link" }
            }
            div style="color:#6b7280;font-size:12px" { "Due: " (fmt_due(a.due_at.as_deref(), tz)) }
        }
    }
}
