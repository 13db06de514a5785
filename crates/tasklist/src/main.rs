//! CLI entry point for tasklist.

use std::{
    io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tasklist_app::{AppConfig, TaskStore, TodoApp};
use tasklist_core::Filter;
use tasklist_store::{FileStore, KeyValueStore, MemoryStore};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use render::{DateStyle, ListFormat};
use terminal::{TerminalPrompter, TerminalView};

mod commands;
mod render;
mod shell;
mod terminal;

/// A personal to-do list kept in a local data directory.
#[derive(Parser, Debug)]
#[command(
    name = "tasklist",
    version,
    about = "tasklist: a personal to-do list stored as JSON in a local data directory"
)]
struct Cli {
    /// Directory holding the task data (overrides the config file and TASKLIST_DATA_DIR).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file to use instead of the per-user one.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Answer yes to every confirmation.
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a new task.
    Add {
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Mark a task completed, or pending again.
    Toggle { id: String },

    /// Replace a task's text; prompts with the current text when none is given.
    Edit { id: String, text: Vec<String> },

    /// Delete a task.
    #[command(visible_alias = "remove")]
    Rm { id: String },

    /// Delete every task.
    Clear,

    /// Delete all completed tasks.
    ClearCompleted,

    /// List tasks.
    Ls {
        #[arg(short, long)]
        filter: Option<Filter>,
        #[arg(long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },

    /// Switch the active filter and show the list.
    Filter { filter: Filter },

    /// Show totals and the completion rate.
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Write every task as a JSON export document.
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace every task with the contents of an export document.
    Import { file: PathBuf },

    /// Start an interactive session.
    Shell,
}

fn main() -> Result<ExitCode> {
    let Cli {
        data_dir,
        config,
        yes,
        cmd,
    } = Cli::parse();

    install_tracing();

    let config = AppConfig::load(config.as_deref())?;
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => config.storage.resolve_data_dir()?,
    };
    execute_command(&config, &data_dir, yes, cmd)
}

fn execute_command(
    config: &AppConfig,
    data_dir: &Path,
    yes: bool,
    command: Command,
) -> Result<ExitCode> {
    let interactive = matches!(command, Command::Shell);
    let style = DateStyle::parse(config.view.date_format())?;
    let store = TaskStore::load(open_storage(data_dir));
    let prompter = TerminalPrompter::new(io::stdin().lock(), io::stderr());
    let view = TerminalView::new(io::stdout(), style, interactive);
    let mut app = TodoApp::new(store, prompter, view)
        .with_filter(config.view.default_filter())
        .with_confirmations(!yes && config.view.confirm_destructive());

    if interactive {
        shell::run(&mut app)?;
        return Ok(ExitCode::SUCCESS);
    }
    let outcome = commands::run(command, &mut app)?;
    Ok(commands::exit_code(outcome))
}

/// Open the data directory, or fall back to a store that lives only as long as the process.
fn open_storage(data_dir: &Path) -> Box<dyn KeyValueStore> {
    match FileStore::open(data_dir)
        .with_context(|| format!("failed to open data directory {}", data_dir.display()))
    {
        Ok(store) => {
            info!(dir = %store.dir().display(), "using file storage");
            Box::new(store)
        }
        Err(err) => {
            error!(error = %format!("{err:#}"), "storage unavailable; changes will not be kept");
            eprintln!("[warn] {err:#}; changes will not be kept");
            Box::new(MemoryStore::new())
        }
    }
}

fn install_tracing() {
    // RUST_LOG overrides; default is WARN so normal output stays clean.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklist_app::COUNTER_KEY;
    use tempfile::tempdir;

    #[test]
    fn parse_add_command() {
        let cli = Cli::parse_from(["tasklist", "--data-dir", "/tmp/tasks", "add", "Buy", "oat milk"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/tasks")));
        match cli.cmd {
            Command::Add { text } => assert_eq!(text, vec!["Buy", "oat milk"]),
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn parse_ls_command() {
        let cli = Cli::parse_from(["tasklist", "ls", "--filter", "done", "--format", "html", "-y"]);
        assert!(cli.yes);
        match cli.cmd {
            Command::Ls { filter, format } => {
                assert_eq!(filter, Some(Filter::Completed));
                assert_eq!(format, ListFormat::Html);
            }
            _ => panic!("expected ls command"),
        }
    }

    #[test]
    fn parse_edit_without_text() {
        let cli = Cli::parse_from(["tasklist", "edit", "3"]);
        match cli.cmd {
            Command::Edit { id, text } => {
                assert_eq!(id, "3");
                assert!(text.is_empty());
            }
            _ => panic!("expected edit command"),
        }
    }

    #[test]
    fn rejects_unknown_filter() {
        assert!(Cli::try_parse_from(["tasklist", "ls", "--filter", "archived"]).is_err());
        assert!(Cli::try_parse_from(["tasklist", "add"]).is_err());
    }

    #[test]
    fn remove_alias_parses() {
        let cli = Cli::parse_from(["tasklist", "remove", "2"]);
        assert!(matches!(cli.cmd, Command::Rm { id } if id == "2"));
    }

    #[test]
    fn open_storage_uses_data_dir() -> Result<()> {
        let dir = tempdir()?;
        let mut store = open_storage(&dir.path().join("data"));
        store.set(COUNTER_KEY, "7")?;
        assert!(dir.path().join("data").join(COUNTER_KEY).exists());
        Ok(())
    }

    #[test]
    fn open_storage_falls_back_to_memory() -> Result<()> {
        let dir = tempdir()?;
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "")?;
        let mut store = open_storage(&blocker);
        store.set(COUNTER_KEY, "2")?;
        assert_eq!(store.get(COUNTER_KEY)?.as_deref(), Some("2"));
        assert!(blocker.is_file());
        Ok(())
    }
}
