use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::parse_due;

// ─── Backend records ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub course_id:     i64,
    pub assignment_id: i64,
    #[serde(default)]
    pub name:          Option<String>,
    #[serde(default)]
    pub due_at:        Option<String>,
    #[serde(default)]
    pub html_url:      Option<String>,
}

impl Assignment {
    /// Parsed due date. `None` when absent or malformed.
    pub fn due(&self) -> Option<DateTime<Utc>> {
        self.due_at.as_deref().and_then(parse_due)
    }

    pub fn display_name(&self) -> String {
        match &self.name {
            Some(n) => n.clone(),
            None    => format!("Assignment #{}", self.assignment_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id:         i64,
    #[serde(default)]
    pub name:       Option<String>,
    #[serde(default)]
    pub term:       String,
    #[serde(default)]
    pub account_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Metrics {
    #[serde(default)] pub courses:        usize,
    #[serde(default)] pub assignments:    usize,
    #[serde(default)] pub deadlines:      usize,
    #[serde(default)] pub scheduled_jobs: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Health {
    pub status: String,
}

impl Health {
    pub fn is_ok(&self) -> bool { self.status == "ok" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_tolerates_missing_optional_fields() {
        let a: Assignment = serde_json::from_str(r#"{"course_id":7,"assignment_id":42}"#)
            .expect("minimal assignment");
        assert_eq!(a.name, None);
        assert_eq!(a.due(), None);
        assert_eq!(a.display_name(), "Assignment #42");
    }

    #[test]
    fn malformed_due_at_is_treated_as_missing() {
        let a = Assignment {
            course_id: 1, assignment_id: 2, name: Some("Lab".into()),
            due_at: Some("next tuesday".into()), html_url: None,
        };
        assert_eq!(a.due(), None);
        assert_eq!(a.display_name(), "Lab");
    }

    #[test]
    fn course_term_defaults_to_empty() {
        let c: Course = serde_json::from_str(r#"{"id":3,"name":null}"#).expect("course");
        assert_eq!(c.term, "");
        assert_eq!(c.name, None);
    }
}
