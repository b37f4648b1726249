//! Read-only client for the course backend (JSON over HTTP).
//!
//! Endpoints:
//!   GET /health                          → { "status": "ok" }
//!   GET /api/courses                     → { "courses": [...] }
//!   GET /api/assignments                 → { "assignments": [...] } or a bare array
//!   GET /api/metrics                     → { "courses", "assignments", "deadlines", "scheduled_jobs" }
//!   GET /api/courses/{id}/staff-emails   → { "emails": [...] }

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::BackendConfig;
use crate::error::Error;
use crate::models::{Assignment, Course, Health, Metrics};

// ─── Response envelopes ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CoursesBody {
    #[serde(default)]
    courses: Vec<Course>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AssignmentsBody {
    Wrapped { #[serde(default)] assignments: Vec<Assignment> },
    Bare(Vec<Assignment>),
}

impl AssignmentsBody {
    fn into_vec(self) -> Vec<Assignment> {
        match self {
            AssignmentsBody::Wrapped { assignments } => assignments,
            AssignmentsBody::Bare(v)                 => v,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StaffEmailsBody {
    #[serde(default)]
    emails: Vec<String>,
}

/// Everything the dashboard views need from one refresh.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub courses:     Vec<Course>,
    pub assignments: Vec<Assignment>,
}

// ─── Client ───────────────────────────────────────────────────────────────────

pub struct BackendClient {
    http:     Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("courseboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base_url: config.base_url.trim_end_matches('/').to_owned() })
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    pub async fn health(&self) -> Result<Health, Error> {
        self.get_json("/health").await
    }

    pub async fn courses(&self) -> Result<Vec<Course>, Error> {
        Ok(self.get_json::<CoursesBody>("/api/courses").await?.courses)
    }

    pub async fn assignments(&self) -> Result<Vec<Assignment>, Error> {
        Ok(self.get_json::<AssignmentsBody>("/api/assignments").await?.into_vec())
    }

    pub async fn metrics(&self) -> Result<Metrics, Error> {
        self.get_json("/api/metrics").await
    }

    pub async fn course_staff_emails(&self, course_id: i64) -> Result<Vec<String>, Error> {
        let path = format!("/api/courses/{course_id}/staff-emails");
        Ok(self.get_json::<StaffEmailsBody>(&path).await?.emails)
    }

    /// Courses and assignments fetched concurrently.
    pub async fn snapshot(&self) -> Result<Snapshot, Error> {
        let (courses, assignments) = tokio::join!(self.courses(), self.assignments());
        let snap = Snapshot { courses: courses?, assignments: assignments? };
        tracing::info!(
            courses = snap.courses.len(), assignments = snap.assignments.len(),
            "fetched snapshot from {}", self.base_url
        );
        Ok(snap)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {url}");
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!("GET {url} → {status}");
            return Err(Error::Status { status: status.as_u16(), url });
        }
        Ok(resp.json().await?)
    }
}
