//! Command-line driver for `todolist_core`.
//!
//! # Responsibility
//! - Exercise the view-model against a local task database.
//! - Surface validation errors the way a presentation layer would.

use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::PathBuf;
use todolist_core::db::open_db;
use todolist_core::{
    default_log_level, init_logging, Coordinate, HttpWeatherClient, Priority, SortCriteria,
    SqliteTaskRepository, Task, TaskDraft, TaskViewModel, WeatherConfig, WeatherOutcome,
};
use uuid::Uuid;

/// Local task list with a current-weather lookup.
#[derive(Parser, Debug)]
#[command(name = "todolist", version, about, long_about = None)]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "TODOLIST_DB", default_value = "todolist.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rolling log files (logging is off when unset)
    #[arg(long, global = true, env = "TODOLIST_LOG_DIR")]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "TODOLIST_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tasks
    List {
        /// Case-insensitive title filter
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        #[arg(long, value_enum, default_value = "all")]
        show: ShowArg,
    },
    /// Add a task
    Add(TaskFields),
    /// Replace a task's fields (completion is kept)
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Flip a task's completion flag
    Toggle { id: Uuid },
    /// Delete a task
    Delete { id: Uuid },
    /// Fetch current weather for a coordinate
    Weather {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
}

#[derive(clap::Args, Debug)]
struct TaskFields {
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: Option<String>,
    /// Attachment reference; repeat for several
    #[arg(long = "attach")]
    attachments: Vec<String>,
    /// High|Medium|Low
    #[arg(long, value_parser = parse_priority, default_value = "Medium")]
    priority: Priority,
    /// Due date as Unix epoch milliseconds
    #[arg(long)]
    due: Option<i64>,
}

impl TaskFields {
    fn into_draft(self) -> TaskDraft {
        let mut draft = TaskDraft::new(self.title, self.priority, self.due)
            .with_attachments(self.attachments);
        draft.description = self.description;
        draft
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    Due,
    Priority,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ShowArg {
    All,
    Completed,
    Pending,
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::parse(value).ok_or_else(|| format!("expected High|Medium|Low, got `{value}`"))
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let conn = open_db(&cli.db)?;
    let repo = SqliteTaskRepository::new(&conn);
    let client = HttpWeatherClient::new(WeatherConfig::from_env()?);
    let mut vm = TaskViewModel::new(repo, client)?;

    match cli.command {
        Command::List { search, sort, show } => {
            if let Some(text) = search {
                vm.search(&text);
            }
            if let Some(sort) = sort {
                vm.sort(match sort {
                    SortArg::Due => SortCriteria::DueDate,
                    SortArg::Priority => SortCriteria::Priority,
                });
            }
            let (completed, pending) =
                todolist_core::query::partition_completed(vm.filtered_tasks());
            let shown = match show {
                ShowArg::All => vm.filtered_tasks().to_vec(),
                ShowArg::Completed => completed,
                ShowArg::Pending => pending,
            };
            for task in &shown {
                println!("{}", render_task(task));
            }
        }
        Command::Add(fields) => {
            let draft = fields.into_draft();
            draft.validate()?;
            let id = vm.add(draft)?;
            println!("{id}");
        }
        Command::Update { id, fields } => {
            let draft = fields.into_draft();
            draft.validate()?;
            vm.update(id, &draft)?;
        }
        Command::Toggle { id } => {
            let is_completed = vm.toggle_completion(id)?;
            println!("{id} completed={is_completed}");
        }
        Command::Delete { id } => vm.delete(id)?,
        Command::Weather { lat, lon } => match vm.fetch_weather(Coordinate::new(lat, lon)) {
            WeatherOutcome::Applied(_) => println!(
                "{}: {} {:.1}°C",
                vm.location_name(),
                vm.weather_description(),
                vm.temperature()
            ),
            // Failures are already logged by the view-model.
            WeatherOutcome::Failed(_) | WeatherOutcome::Stale { .. } => {
                println!("weather unavailable")
            }
        },
    }

    Ok(())
}

fn render_task(task: &Task) -> String {
    let mark = if task.is_completed { "x" } else { " " };
    let due = task
        .due_at
        .map_or_else(|| "-".to_string(), |due| due.to_string());
    format!(
        "[{mark}] {} {:<6} due={due} {}",
        task.id,
        task.priority.as_str(),
        task.title
    )
}
