#![allow(missing_docs)]

use anyhow::Result;
use std::fs;
use tasklist_store::{FileStore, KeyValueStore, PersistenceError};
use tempfile::TempDir;

#[test]
fn values_survive_reopen() -> Result<()> {
    let dir = TempDir::with_prefix("tasklist-store-test-")?;
    let namespace = dir.path().join("namespace");

    let mut store = FileStore::open(&namespace)?;
    assert_eq!(store.get("todoTasks")?, None);
    store.set("todoTasks", r#"[{"id":1}]"#)?;
    store.set("taskIdCounter", "2")?;

    let reopened = FileStore::open(&namespace)?;
    assert_eq!(reopened.get("todoTasks")?.as_deref(), Some(r#"[{"id":1}]"#));
    assert_eq!(reopened.get("taskIdCounter")?.as_deref(), Some("2"));
    Ok(())
}

#[test]
fn overwrite_leaves_no_temporary_files() -> Result<()> {
    let dir = TempDir::with_prefix("tasklist-store-test-")?;
    let mut store = FileStore::open(dir.path())?;

    for value in ["1", "2", "3"] {
        store.set("taskIdCounter", value)?;
    }
    assert_eq!(store.get("taskIdCounter")?.as_deref(), Some("3"));

    let names: Vec<String> = fs::read_dir(store.dir())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["taskIdCounter".to_owned()]);
    Ok(())
}

#[test]
fn path_like_keys_are_refused() -> Result<()> {
    let dir = TempDir::with_prefix("tasklist-store-test-")?;
    let mut store = FileStore::open(dir.path())?;

    let Err(err) = store.set("../outside", "x") else {
        panic!("path traversal must be rejected");
    };
    assert!(matches!(err, PersistenceError::InvalidKey(_)));
    assert!(!dir.path().join("..").join("outside").exists());
    Ok(())
}

#[test]
fn open_fails_when_namespace_is_a_file() -> Result<()> {
    let dir = TempDir::with_prefix("tasklist-store-test-")?;
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory")?;

    let Err(err) = FileStore::open(&blocker) else {
        panic!("opening a file as namespace should fail");
    };
    assert!(matches!(err, PersistenceError::Unavailable(_)));
    Ok(())
}
