use std::{fs, io::Write, path::Path, process::ExitCode, str::FromStr};

use anyhow::{Context, Result, bail};
use tasklist_app::{Outcome, Prompter, TodoApp};
use tasklist_core::{Filter, TaskId};
use tasklist_store::KeyValueStore;
use time::OffsetDateTime;
use tracing::info;

use crate::Command;
use crate::render::{self, ListFormat};
use crate::terminal::TerminalView;

type App<S, P, W> = TodoApp<S, P, TerminalView<W>>;

/// Execute one command against `app`. `Command::Shell` is refused; the caller runs sessions.
pub fn run<S, P, W>(command: Command, app: &mut App<S, P, W>) -> Result<Outcome>
where
    S: KeyValueStore,
    P: Prompter,
    W: Write,
{
    let outcome = match command {
        Command::Add { text } => app.add_task(&text.join(" ")),
        Command::Toggle { id } => app.toggle_task(parse_task_id(&id)?),
        Command::Edit { id, text } => {
            let id = parse_task_id(&id)?;
            if text.is_empty() {
                app.edit_task(id, None)
            } else {
                app.edit_task(id, Some(&text.join(" ")))
            }
        }
        Command::Rm { id } => app.remove_task(parse_task_id(&id)?),
        Command::Clear => app.clear_all(),
        Command::ClearCompleted => app.clear_completed(),
        Command::Ls { filter, format } => {
            list(app, filter, format)?;
            Outcome::Unchanged
        }
        Command::Filter { filter } => {
            app.set_filter(filter);
            if !app.view().redraws() {
                list(app, None, ListFormat::Table)?;
            }
            Outcome::Unchanged
        }
        Command::Stats { json } => {
            let stats = app.stats();
            let line = if json {
                serde_json::to_string_pretty(&stats)?
            } else {
                render::stats_line(&stats)
            };
            app.view_mut().print(&line);
            Outcome::Unchanged
        }
        Command::Export { output } => {
            let document = app.export_tasks()?;
            match output {
                Some(path) => {
                    write_export(&path, &document)?;
                    let count = app.store().len();
                    info!(path = %path.display(), count, "exported tasks");
                    app.view_mut()
                        .print(&format!("Exported {count} task(s) to {}", path.display()));
                }
                None => app.view_mut().print(&document),
            }
            Outcome::Unchanged
        }
        Command::Import { file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            app.import_tasks(&raw)
        }
        Command::Shell => bail!("the interactive shell cannot run as a single command"),
    };

    Ok(outcome)
}

/// Map an intent outcome to the process status.
pub fn exit_code(outcome: Outcome) -> ExitCode {
    if outcome == Outcome::Rejected {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn list<S, P, W>(app: &mut App<S, P, W>, filter: Option<Filter>, format: ListFormat) -> Result<()>
where
    S: KeyValueStore,
    P: Prompter,
    W: Write,
{
    let filter = filter.unwrap_or_else(|| app.filter());
    let projection = app.store().projection(filter);
    let style = app.view().style();
    let rendered = match format {
        ListFormat::Table => render::table(&projection, style, OffsetDateTime::now_utc()),
        ListFormat::Json => render::json(&projection)?,
        ListFormat::Html => render::html(&projection, style),
    };
    app.view_mut().print(&rendered);
    Ok(())
}

fn write_export(path: &Path, document: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, document).with_context(|| format!("failed to write {}", path.display()))
}

fn parse_task_id(raw: &str) -> Result<TaskId> {
    TaskId::from_str(raw).with_context(|| format!("Invalid task id: {raw}"))
}
