//! Drives the built binary against a scratch data directory.

use std::path::PathBuf;
use std::process::{Command, Output};

use anyhow::{Result, anyhow};
use assert_cmd::cargo::CommandCargoExt;
use serde_json::Value;
use tempfile::TempDir;

struct Sandbox {
    temp: TempDir,
}

impl Sandbox {
    fn new() -> Result<Self> {
        Ok(Self {
            temp: tempfile::tempdir()?,
        })
    }

    fn data_dir(&self) -> PathBuf {
        self.temp.path().join("data")
    }

    fn command(&self) -> Result<Command> {
        let mut cmd = Command::cargo_bin("tasklist")?;
        cmd.arg("--data-dir")
            .arg(self.data_dir())
            .env("XDG_CONFIG_HOME", self.temp.path().join("config"))
            .env_remove("TASKLIST_DATA_DIR")
            .env_remove("RUST_LOG");
        Ok(cmd)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        Ok(self.command()?.args(args).output()?)
    }

    fn run_with_stdin(&self, args: &[&str], input: &str) -> Result<Output> {
        use std::io::Write;
        use std::process::Stdio;

        let mut child = self
            .command()?
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("stdin not captured"))?
            .write_all(input.as_bytes())?;
        Ok(child.wait_with_output()?)
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn listing(sandbox: &Sandbox, filter: &str) -> Result<Value> {
    let output = sandbox.run(&["ls", "--filter", filter, "--format", "json"])?;
    assert!(output.status.success(), "ls failed: {output:?}");
    Ok(serde_json::from_str(&stdout(&output))?)
}

#[test]
fn add_toggle_and_list_persist_between_runs() -> Result<()> {
    let sandbox = Sandbox::new()?;
    assert!(sandbox.run(&["add", "Buy", "milk"])?.status.success());
    assert!(sandbox.run(&["add", "Walk dog"])?.status.success());
    assert!(sandbox.run(&["toggle", "1"])?.status.success());

    let all = listing(&sandbox, "all")?;
    assert_eq!(all["counters"]["total"], 2);
    assert_eq!(all["tasks"][0]["text"], "Walk dog");
    assert_eq!(all["tasks"][1]["text"], "Buy milk");

    let pending = listing(&sandbox, "pending")?;
    assert_eq!(pending["tasks"].as_array().map(Vec::len), Some(1));
    assert_eq!(pending["tasks"][0]["id"], 2);

    assert_eq!(
        std::fs::read_to_string(sandbox.data_dir().join("taskIdCounter"))?,
        "3"
    );
    Ok(())
}

#[test]
fn blank_task_is_rejected_with_failure_status() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let output = sandbox.run(&["add", "   "])?;
    assert!(!output.status.success());
    assert!(stdout(&output).contains("Please type a task!"));
    Ok(())
}

#[test]
fn clear_respects_confirmation_and_yes_flag() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.run(&["add", "one"])?;

    let declined = sandbox.run_with_stdin(&["clear"], "n\n")?;
    assert!(declined.status.success());
    assert_eq!(listing(&sandbox, "all")?["counters"]["total"], 1);

    let forced = sandbox.run(&["--yes", "clear"])?;
    assert!(stdout(&forced).contains("All tasks have been removed!"));
    assert_eq!(listing(&sandbox, "all")?["counters"]["total"], 0);
    Ok(())
}

#[test]
fn export_and_import_between_data_dirs() -> Result<()> {
    let source = Sandbox::new()?;
    source.run(&["add", "<b>bold</b> & more"])?;
    let export_path = source.temp.path().join("export.json");
    let export_arg = export_path.to_string_lossy().into_owned();
    assert!(source.run(&["export", "--output", &export_arg])?.status.success());

    let target = Sandbox::new()?;
    let imported = target.run(&["import", &export_arg])?;
    assert!(imported.status.success(), "import failed: {imported:?}");
    assert!(stdout(&imported).contains("Imported 1 task(s)"));

    let html = target.run(&["ls", "--format", "html"])?;
    assert!(stdout(&html).contains("&lt;b&gt;bold&lt;/b&gt; &amp; more"));
    Ok(())
}

#[test]
fn shell_session_reads_intents_from_stdin() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let output = sandbox.run_with_stdin(
        &["shell"],
        "add \"Read book\"\nedit 1\nRead two books\nstats\nquit\n",
    )?;
    assert!(output.status.success());
    assert!(stdout(&output).contains("Total: 1  Pending: 1  Completed: 0  Completion: 0%"));
    assert_eq!(listing(&sandbox, "all")?["tasks"][0]["text"], "Read two books");
    Ok(())
}

#[test]
fn unusable_data_dir_still_runs_in_memory() -> Result<()> {
    let sandbox = Sandbox::new()?;
    std::fs::write(sandbox.data_dir(), "")?;
    let output = sandbox.run(&["add", "ephemeral"])?;
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("changes will not be kept"));
    assert!(sandbox.data_dir().is_file());
    Ok(())
}
