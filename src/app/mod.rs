use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{
    api::{BackendClient, Snapshot},
    calendar::{self, Range},
    config::AppConfig,
    countup::CountUp,
    dates::{start_of_day, start_of_today},
    digest, email,
    models::Assignment,
    store::FileStore,
    todos::{TodoList, TodoPatch},
    ui::{self, Stats},
    workload,
};

const COUNT_UP_DURATION: Duration = Duration::from_millis(600);
const COUNT_UP_FRAME:    Duration = Duration::from_millis(16);

pub const DEFAULT_DIGEST_FILE: &str = "weekly-digest.html";

// ─── Todo sub-commands ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TodoCommand {
    List,
    Add(String),
    Toggle(String),
    Edit(String, String),
    Remove(String),
    Clear,
}

// ─── App state ────────────────────────────────────────────────────────────────

pub struct App<Tz: TimeZone> {
    pub client:        BackendClient,
    pub todos:         TodoList<FileStore>,
    pub tz:            Tz,
    pub default_range: Range,
}

impl<Tz> App<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    pub fn new(cfg: &AppConfig, tz: Tz) -> Result<Self> {
        let client = BackendClient::new(&cfg.backend)?;
        let data_dir = cfg.data_dir();
        let store = FileStore::open(&data_dir)
            .with_context(|| format!("failed to open data dir {}", data_dir.display()))?;
        Ok(Self {
            client,
            todos: TodoList::load(store),
            tz,
            default_range: cfg.default_range()?,
        })
    }

    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    async fn assignments(&self) -> Result<Vec<Assignment>> {
        self.client.assignments().await
            .with_context(|| format!("failed to fetch assignments from {}", self.client.base_url()))
    }

    async fn snapshot(&self) -> Result<Snapshot> {
        self.client.snapshot().await
            .with_context(|| format!("failed to fetch data from {}", self.client.base_url()))
    }

    // ── Views ─────────────────────────────────────────────────────────────────

    pub async fn dashboard(&self) -> Result<()> {
        let snap = self.snapshot().await?;
        let now  = self.now();
        let jobs = self.scheduled_jobs().await;

        println!("{}\n", ui::render_stats(&stats_for(&snap, &now, jobs)));
        println!("── Calendar ──");
        println!("{}", self.calendar_text(&snap.assignments, self.default_range, &start_of_day(&now)));
        println!("── Workload (next 8 weeks) ──");
        println!("{}", workload_text(&snap.assignments, &now));
        println!("── Checklist ({} open) ──", self.todos.open_items().count());
        print!("{}", ui::render_todos(self.todos.items()));
        Ok(())
    }

    pub async fn calendar(&self, range: Option<Range>) -> Result<()> {
        let assignments = self.assignments().await?;
        let range = range.unwrap_or(self.default_range);
        print!("{}", self.calendar_text(&assignments, range, &start_of_today(&self.tz)));
        Ok(())
    }

    pub async fn workload(&self) -> Result<()> {
        let assignments = self.assignments().await?;
        print!("{}", workload_text(&assignments, &self.now()));
        Ok(())
    }

    fn calendar_text(&self, assignments: &[Assignment], range: Range, today: &DateTime<Tz>) -> String {
        let (from, to) = range.window(today);
        let groups = calendar::bucket(assignments, range, today);
        ui::render_calendar(&groups, range, &from, &to)
    }

    // ── Digest ────────────────────────────────────────────────────────────────

    pub async fn digest(&self, out: Option<PathBuf>, open: bool) -> Result<()> {
        let assignments = self.assignments().await?;
        let html = digest::build_digest(&assignments, self.todos.items(), &self.now());

        let target = match (out, open) {
            (Some(p), _)  => Some(p),
            (None, true)  => Some(PathBuf::from(DEFAULT_DIGEST_FILE)),
            (None, false) => None,
        };
        let Some(path) = target else {
            print!("{html}");
            return Ok(());
        };

        write_digest(&path, &html)?;
        println!("Digest written to {}", path.display());
        if open {
            // Opening is best effort; the file is already on disk.
            if let Err(e) = open::that(&path) {
                tracing::warn!("could not open {}: {e}", path.display());
            }
        }
        Ok(())
    }

    // ── Checklist ─────────────────────────────────────────────────────────────

    pub fn todo(&mut self, cmd: TodoCommand) -> Result<()> {
        match cmd {
            TodoCommand::List => {}
            TodoCommand::Add(title) => {
                if self.todos.add(&title).is_none() {
                    return Err(anyhow!("todo title cannot be empty"));
                }
            }
            TodoCommand::Toggle(prefix) => {
                let id = self.resolve_todo(&prefix)?;
                self.todos.toggle(&id);
            }
            TodoCommand::Edit(prefix, title) => {
                let id = self.resolve_todo(&prefix)?;
                self.todos.update(&id, TodoPatch { title: Some(title), done: None });
            }
            TodoCommand::Remove(prefix) => {
                let id = self.resolve_todo(&prefix)?;
                self.todos.remove(&id);
            }
            TodoCommand::Clear => self.todos.clear(),
        }
        print!("{}", ui::render_todos(self.todos.items()));
        Ok(())
    }

    fn resolve_todo(&self, prefix: &str) -> Result<String> {
        self.todos.find_by_prefix(prefix)
            .map(|t| t.id.clone())
            .ok_or_else(|| anyhow!("no single todo matches '{prefix}'"))
    }

    // ── Email ─────────────────────────────────────────────────────────────────

    pub async fn email(&self, course_id: i64, assignment_name: Option<String>) -> Result<()> {
        let emails = match self.client.course_staff_emails(course_id).await {
            Ok(e)  => e,
            Err(e) => {
                tracing::warn!("staff email lookup for course {course_id} failed: {e}");
                Vec::new()
            }
        };
        let link = email::compose_mailto(course_id, assignment_name.as_deref(), &emails);
        println!("{link}");
        if let Err(e) = open::that(&link) {
            tracing::warn!("could not open mail client: {e}");
        }
        Ok(())
    }

    // ── Stats / health ────────────────────────────────────────────────────────

    pub async fn stats(&self, plain: bool) -> Result<()> {
        let snap  = self.snapshot().await?;
        let stats = stats_for(&snap, &self.now(), self.scheduled_jobs().await);

        if plain {
            println!("{}", ui::render_stats(&stats));
            return Ok(());
        }

        let counter = |to: i64| CountUp::new(0, to, COUNT_UP_DURATION, COUNT_UP_FRAME);
        let frames = counter(stats.courses)
            .zip(counter(stats.assignments))
            .zip(counter(stats.upcoming))
            .zip(counter(stats.scheduled_jobs));

        let mut stdout = std::io::stdout();
        for (((courses, assignments), upcoming), scheduled_jobs) in frames {
            let frame = Stats { courses, assignments, upcoming, scheduled_jobs };
            write!(stdout, "\r{}", ui::render_stats(&frame))?;
            stdout.flush()?;
            tokio::time::sleep(COUNT_UP_FRAME).await;
        }
        writeln!(stdout)?;
        Ok(())
    }

    pub async fn health(&self) -> Result<()> {
        let h = self.client.health().await
            .with_context(|| format!("backend at {} is unreachable", self.client.base_url()))?;
        println!("{}: {}", self.client.base_url(), h.status);
        if !h.is_ok() {
            return Err(anyhow!("backend reported status '{}'", h.status));
        }
        match self.client.metrics().await {
            Ok(m)  => println!(
                "courses={} assignments={} deadlines={} scheduled_jobs={}",
                m.courses, m.assignments, m.deadlines, m.scheduled_jobs,
            ),
            Err(e) => tracing::warn!("metrics unavailable: {e}"),
        }
        Ok(())
    }

    /// Scheduled-job count from the metrics endpoint; 0 when unavailable.
    async fn scheduled_jobs(&self) -> i64 {
        match self.client.metrics().await {
            Ok(m)  => m.scheduled_jobs as i64,
            Err(e) => {
                tracing::warn!("metrics unavailable: {e}");
                0
            }
        }
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

pub fn stats_for<Tz: TimeZone>(snap: &Snapshot, now: &DateTime<Tz>, scheduled_jobs: i64) -> Stats {
    Stats {
        courses:     snap.courses.len() as i64,
        assignments: snap.assignments.len() as i64,
        upcoming:    digest::upcoming(&snap.assignments, now).len() as i64,
        scheduled_jobs,
    }
}

fn workload_text<Tz: TimeZone>(assignments: &[Assignment], now: &DateTime<Tz>) -> String {
    let buckets = workload::aggregate(assignments, now);
    ui::render_workload(&buckets, &workload::course_legend(assignments))
}

fn write_digest(path: &Path, html: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write {}", path.display()))
}
