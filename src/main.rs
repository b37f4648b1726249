mod api;
mod app;
mod calendar;
mod config;
mod countup;
mod dates;
mod digest;
mod email;
mod error;
mod models;
mod store;
mod todos;
mod ui;
mod workload;

use anyhow::{anyhow, Context, Result};
use app::{App, TodoCommand};
use calendar::Range;
use chrono::{Local, TimeZone};
use config::AppConfig;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

const USAGE: &str = "\
usage: cb [command]

  dashboard                      stats, calendar, workload and checklist (default)
  calendar [day|3d|7d|month]     assignments grouped by day
  workload                       per-course counts for the next 8 weeks
  digest [--out PATH] [--open]   weekly digest as HTML (stdout unless --out/--open)
  todo [list]                    show the checklist
  todo add <title...>            add an item
  todo toggle <id>               mark done / not done (id prefix is enough)
  todo edit <id> <title...>      rename an item
  todo rm <id>                   delete an item
  todo clear                     delete everything
  email <course_id> [name...]    draft a mail to course staff
  stats [--plain]                headline counters
  health                         check the backend";

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Dashboard,
    Calendar(Option<Range>),
    Workload,
    Digest { out: Option<PathBuf>, open: bool },
    Todo(TodoCommand),
    Email { course_id: i64, assignment: Option<String> },
    Stats { plain: bool },
    Health,
    Help,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_command(&args)?;
    if command == Command::Help {
        println!("{USAGE}");
        return Ok(());
    }

    let cfg = AppConfig::load()?;
    let _guard = init_logging(&cfg.data_dir())?;
    tracing::info!(?command, backend = %cfg.backend.base_url, "starting courseboard");

    // ── Reference time zone: configured IANA zone, else the system zone ───────
    match cfg.zone()? {
        Some(tz) => run(command, &cfg, tz).await,
        None     => run(command, &cfg, Local).await,
    }
}

async fn run<Tz>(command: Command, cfg: &AppConfig, tz: Tz) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut app = App::new(cfg, tz)?;
    match command {
        Command::Dashboard                  => app.dashboard().await,
        Command::Calendar(range)            => app.calendar(range).await,
        Command::Workload                   => app.workload().await,
        Command::Digest { out, open }       => app.digest(out, open).await,
        Command::Todo(cmd)                  => app.todo(cmd),
        Command::Email { course_id, assignment } => app.email(course_id, assignment).await,
        Command::Stats { plain }            => app.stats(plain).await,
        Command::Health                     => app.health().await,
        Command::Help                       => Ok(()),
    }
}

// ─── Logging ──────────────────────────────────────────────────────────────────

/// Daily log file in the data dir (filtered by `RUST_LOG`, default
/// `courseboard=info`) plus warnings on stderr.
fn init_logging(data_dir: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(data_dir, "courseboard.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("courseboard=info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(LevelFilter::WARN),
        )
        .init();
    Ok(guard)
}

// ─── Argument parsing ─────────────────────────────────────────────────────────

fn parse_command(args: &[String]) -> Result<Command> {
    let arg = |i: usize| args.get(i).map(|s| s.as_str());
    let rest = |from: usize| args.get(from..).map(|r| r.join(" ")).unwrap_or_default();

    match arg(0) {
        None | Some("dashboard") => Ok(Command::Dashboard),
        Some("help" | "-h" | "--help") => Ok(Command::Help),
        Some("calendar") => Ok(Command::Calendar(arg(1).map(str::parse::<Range>).transpose()?)),
        Some("workload") => Ok(Command::Workload),
        Some("digest") => {
            let mut out  = None;
            let mut open = false;
            let mut i = 1;
            while let Some(a) = arg(i) {
                match a {
                    "--open" => open = true,
                    "--out"  => {
                        let p = arg(i + 1).ok_or_else(|| anyhow!("--out needs a path"))?;
                        out = Some(PathBuf::from(p));
                        i += 1;
                    }
                    other => return Err(anyhow!("unknown digest option '{other}'")),
                }
                i += 1;
            }
            Ok(Command::Digest { out, open })
        }
        Some("todo") => {
            let need = |i: usize, what: &str| {
                arg(i).map(str::to_owned).ok_or_else(|| anyhow!("todo: missing {what}"))
            };
            let cmd = match arg(1) {
                None | Some("list") => TodoCommand::List,
                Some("add")         => TodoCommand::Add(rest(2)),
                Some("toggle")      => TodoCommand::Toggle(need(2, "id")?),
                Some("edit")        => {
                    let id = need(2, "id")?;
                    need(3, "title")?;
                    TodoCommand::Edit(id, rest(3))
                }
                Some("rm" | "remove") => TodoCommand::Remove(need(2, "id")?),
                Some("clear")       => TodoCommand::Clear,
                Some(other)         => return Err(anyhow!("unknown todo command '{other}'")),
            };
            Ok(Command::Todo(cmd))
        }
        Some("email") => {
            let course_id = arg(1)
                .ok_or_else(|| anyhow!("email: missing course id"))?
                .parse::<i64>()
                .context("email: course id must be a number")?;
            let name = rest(2);
            Ok(Command::Email {
                course_id,
                assignment: if name.is_empty() { None } else { Some(name) },
            })
        }
        Some("stats")  => Ok(Command::Stats { plain: arg(1) == Some("--plain") }),
        Some("health") => Ok(Command::Health),
        Some(other)    => Err(anyhow!("unknown command '{other}'\n\n{USAGE}")),
    }
}
