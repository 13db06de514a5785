//! Interactive session: every input line is one intent.

use std::io::{BufRead, Write};

use anyhow::Result;
use clap::Parser;
use tasklist_app::TodoApp;
use tasklist_store::KeyValueStore;
use tracing::debug;

use crate::Command;
use crate::commands;
use crate::terminal::{TerminalPrompter, TerminalView};

const PROMPT: &str = "tasklist> ";
const BANNER: &str = "Type `help` for commands, `quit` to leave.";

/// Grammar of one shell line; the same subcommands as the command line.
#[derive(Parser, Debug)]
#[command(name = "tasklist", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug)]
enum Line {
    Blank,
    Quit,
    Run(Command),
    Invalid(String),
}

fn parse_line(line: &str) -> Line {
    let words = match shell_words::split(line) {
        Ok(words) => words,
        Err(err) => return Line::Invalid(format!("could not parse input: {err}")),
    };
    match words.first().map(String::as_str) {
        None => Line::Blank,
        Some("quit" | "exit") => Line::Quit,
        Some(_) => match ShellLine::try_parse_from(words) {
            Ok(ShellLine { cmd: Command::Shell }) => {
                Line::Invalid("already in an interactive session".to_owned())
            }
            Ok(ShellLine { cmd }) => Line::Run(cmd),
            Err(err) => Line::Invalid(err.render().to_string()),
        },
    }
}

/// Read lines through the app's prompter until `quit` or end of input.
///
/// Prompts raised by an intent read the following line, so a script such as
/// `edit 3` followed by the replacement text works the same as typing it.
pub fn run<S, R, E, W>(app: &mut TodoApp<S, TerminalPrompter<R, E>, TerminalView<W>>) -> Result<()>
where
    S: KeyValueStore,
    R: BufRead,
    E: Write,
    W: Write,
{
    app.view_mut().print(BANNER);
    app.refresh();

    while let Some(line) = app.prompter_mut().read_line(PROMPT)? {
        match parse_line(&line) {
            Line::Blank => {}
            Line::Quit => break,
            Line::Invalid(message) => app.view_mut().print(message.trim_end()),
            Line::Run(command) => {
                debug!(?command, "shell command");
                if let Err(err) = commands::run(command, app) {
                    app.view_mut().print(&format!("[error] {err:#}"));
                }
            }
        }
    }
    Ok(())
}
