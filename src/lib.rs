// src/lib.rs

pub mod cli;
pub mod clock;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::clock::TokioClock;
use crate::config::{default_project_path, load_project, load_watch_plan, Project, ServiceWatch};
use crate::engine::WatchSession;
use crate::exec::LogBackend;
use crate::fs::RealFileSystem;
use crate::watch::NotifyWatcher;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - project loading and watch-rule extraction
/// - one OS watcher + triage task per service
/// - the shared rebuild debouncer
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let fs = RealFileSystem;
    let project_file = args.file.clone().unwrap_or_else(default_project_path);
    let project = load_project(&project_file, &fs)?;
    let plan = load_watch_plan(&project, &args.services, &fs)?;

    if args.dry_run {
        print_dry_run(&project, &plan);
        return Ok(());
    }

    let cancel = CancellationToken::new();

    // Ctrl-C → cancel the whole session.
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("interrupt received; stopping watch");
            cancel.cancel();
        });
    }

    let mut session = WatchSession::new(cancel, TokioClock)
        .with_quiet_period(Duration::from_millis(args.quiet_period_ms));

    for watch in plan {
        let watcher = NotifyWatcher::new(
            watch.service.clone(),
            watch.triggers.iter().map(|t| t.path.clone()),
        );
        debug!(?watcher, "prepared watcher");
        session.add_service(watch, watcher);
    }

    println!("[devloop] watching for changes, press Ctrl+C to stop");
    session.run(LogBackend::default(), LogBackend::default()).await?;
    Ok(())
}

/// Simple dry-run output: print every service's resolved triggers.
fn print_dry_run(project: &Project, plan: &[ServiceWatch]) {
    println!("devloop dry-run");
    if let Some(name) = &project.name {
        println!("  project = {name}");
    }
    println!("  working_dir = {}", project.working_dir.display());
    println!();

    println!("services ({}):", plan.len());
    for watch in plan {
        println!("  - {}", watch.service);
        for trigger in &watch.triggers {
            print!("      {} {}", trigger.action, trigger.path.display());
            if let Some(target) = &trigger.target {
                print!(" -> {target}");
            }
            println!();
            if !trigger.ignore.is_empty() {
                println!("        ignore: {:?}", trigger.ignore);
            }
        }
    }

    debug!("dry-run complete (nothing watched)");
}
