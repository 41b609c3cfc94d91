// tests/notify_watcher.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::fs;
use std::path::Path;

use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use devloop::config::Trigger;
use devloop::types::{FileMapping, TriggerAction};
use devloop::watch::{run_triage, EventStream, FileWatcher, NotifyWatcher, SINK_CAPACITY};

type TestResult = Result<(), Box<dyn Error>>;

async fn wait_for_path(events: &mut EventStream, wanted: &Path) -> bool {
    while let Some(event) = events.recv().await {
        if event.path == wanted {
            return true;
        }
    }
    false
}

#[tokio::test]
async fn reports_absolute_path_of_written_file() -> TestResult {
    init_tracing();

    let tmp = TempDir::new()?;
    let root = tmp.path().canonicalize()?;
    fs::create_dir(root.join("src"))?;

    let mut watcher = NotifyWatcher::new("app", vec![root.clone()]);
    let mut events = watcher.events().ok_or("event stream missing")?;
    watcher.start()?;

    let file = root.join("src/main.rs");
    fs::write(&file, "fn main() {}")?;

    assert!(with_timeout(wait_for_path(&mut events, &file)).await);

    watcher.close()?;
    Ok(())
}

#[tokio::test]
async fn event_stream_ends_after_close() -> TestResult {
    init_tracing();

    let tmp = TempDir::new()?;
    let mut watcher = NotifyWatcher::new("app", vec![tmp.path().canonicalize()?]);
    let mut events = watcher.events().ok_or("event stream missing")?;
    watcher.start()?;
    watcher.close()?;

    // Anything already buffered is drained, then the stream ends.
    with_timeout(async { while events.recv().await.is_some() {} }).await;
    Ok(())
}

#[tokio::test]
async fn file_trigger_is_watched_through_its_directory() -> TestResult {
    init_tracing();

    let tmp = TempDir::new()?;
    let root = tmp.path().canonicalize()?;
    let conf = root.join("app.conf");
    fs::write(&conf, "a = 1")?;

    let triggers = vec![Trigger {
        path: conf.clone(),
        action: TriggerAction::Sync,
        target: Some("/etc/app.conf".to_string()),
        ignore: Vec::new(),
    }];

    let watcher = NotifyWatcher::new("app", vec![conf.clone()]);
    assert_eq!(watcher.roots().collect::<Vec<_>>(), vec![root.as_path()]);

    let (sync_tx, mut sync_rx) = mpsc::channel(SINK_CAPACITY);
    let (rebuild_tx, _rebuild_rx) = mpsc::channel(SINK_CAPACITY);
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run_triage(
        cancel.clone(),
        "app",
        watcher,
        triggers,
        sync_tx,
        rebuild_tx,
    ));

    // Give the watcher a moment to register before touching files.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    fs::write(root.join("unrelated.txt"), "x")?;
    fs::write(&conf, "a = 2")?;

    let mapping = with_timeout(sync_rx.recv()).await.ok_or("sync sink closed")?;
    assert_eq!(mapping, FileMapping::sync("app", conf, "/etc/app.conf"));

    cancel.cancel();
    with_timeout(task).await??;
    Ok(())
}
