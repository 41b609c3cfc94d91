// src/watch/watcher.rs

use std::path::{Path, PathBuf};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Capacity of the channels between the OS watcher thread and the async
/// consumer. When full, the notify thread blocks until the consumer catches up.
pub const WATCHER_BUFFER: usize = 256;

/// A change reported by the watcher. `path` is absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
}

impl FileEvent {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

pub type EventStream = mpsc::Receiver<FileEvent>;
pub type ErrorStream = mpsc::Receiver<notify::Error>;

/// The capabilities the triage loop needs from a filesystem watcher.
///
/// `events` and `errors` hand out their stream once; later calls return
/// `None`. Both streams end after `close`.
pub trait FileWatcher: Send {
    fn start(&mut self) -> notify::Result<()>;

    /// Stop watching and release OS resources. Calling it again is a no-op.
    fn close(&mut self) -> notify::Result<()>;

    fn events(&mut self) -> Option<EventStream>;
    fn errors(&mut self) -> Option<ErrorStream>;
}

impl<T: FileWatcher + ?Sized> FileWatcher for Box<T> {
    fn start(&mut self) -> notify::Result<()> {
        (**self).start()
    }

    fn close(&mut self) -> notify::Result<()> {
        (**self).close()
    }

    fn events(&mut self) -> Option<EventStream> {
        (**self).events()
    }

    fn errors(&mut self) -> Option<ErrorStream> {
        (**self).errors()
    }
}

/// [`FileWatcher`] backed by the platform's recommended `notify` watcher.
pub struct NotifyWatcher {
    service: String,
    roots: Vec<(PathBuf, RecursiveMode)>,
    inner: Option<RecommendedWatcher>,
    senders: Option<(mpsc::Sender<FileEvent>, mpsc::Sender<notify::Error>)>,
    events: Option<EventStream>,
    errors: Option<ErrorStream>,
}

impl std::fmt::Debug for NotifyWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyWatcher")
            .field("service", &self.service)
            .field("roots", &self.roots)
            .field("running", &self.inner.is_some())
            .finish()
    }
}

impl NotifyWatcher {
    /// Prepare a watcher over the given trigger paths. Nothing is watched
    /// until [`FileWatcher::start`].
    pub fn new<I>(service: impl Into<String>, paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let (event_tx, event_rx) = mpsc::channel(WATCHER_BUFFER);
        let (error_tx, error_rx) = mpsc::channel(WATCHER_BUFFER);

        Self {
            service: service.into(),
            roots: watch_roots(paths),
            inner: None,
            senders: Some((event_tx, error_tx)),
            events: Some(event_rx),
            errors: Some(error_rx),
        }
    }

    /// Directories that will actually be registered with the OS.
    pub fn roots(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(|(p, _)| p.as_path())
    }
}

impl FileWatcher for NotifyWatcher {
    fn start(&mut self) -> notify::Result<()> {
        if self.inner.is_some() {
            return Ok(());
        }
        let Some((event_tx, error_tx)) = self.senders.clone() else {
            return Err(notify::Error::generic("watcher has already been closed"));
        };

        // Runs on notify's own thread, outside the Tokio runtime, so
        // blocking sends are allowed here.
        let service = self.service.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if matches!(event.kind, EventKind::Access(_)) {
                        return;
                    }
                    for path in event.paths {
                        if event_tx.blocking_send(FileEvent::new(path)).is_err() {
                            debug!(service = %service, "event receiver dropped");
                            return;
                        }
                    }
                }
                Err(err) => {
                    let _ = error_tx.blocking_send(err);
                }
            },
            Config::default(),
        )?;

        for (root, mode) in &self.roots {
            watcher
                .watch(root, *mode)
                .map_err(|err| err.add_path(root.clone()))?;
            debug!(service = %self.service, root = ?root, ?mode, "watching");
        }

        info!(service = %self.service, roots = self.roots.len(), "file watcher started");
        self.inner = Some(watcher);
        Ok(())
    }

    fn close(&mut self) -> notify::Result<()> {
        // Dropping the OS watcher drops its callback, and with it the
        // senders feeding our streams.
        if self.inner.take().is_some() {
            info!(service = %self.service, "file watcher stopped");
        }
        self.senders = None;
        Ok(())
    }

    fn events(&mut self) -> Option<EventStream> {
        self.events.take()
    }

    fn errors(&mut self) -> Option<ErrorStream> {
        self.errors.take()
    }
}

/// Reduce trigger paths to the minimal set of OS watches.
///
/// Directories are watched recursively. A file is watched through its parent
/// directory (non-recursively) so that editors replacing the file by rename
/// are still observed. Anything already covered by a recursive root is
/// dropped.
pub fn watch_roots<I>(paths: I) -> Vec<(PathBuf, RecursiveMode)>
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut candidates: Vec<(PathBuf, RecursiveMode)> = paths
        .into_iter()
        .map(|p| {
            if p.is_dir() {
                (p, RecursiveMode::Recursive)
            } else {
                let parent = p.parent().map(Path::to_path_buf).unwrap_or(p);
                (parent, RecursiveMode::NonRecursive)
            }
        })
        .collect();

    // Shorter paths first; for the same path, recursive before non-recursive.
    candidates.sort_by(|(a, am), (b, bm)| {
        a.cmp(b)
            .then_with(|| mode_rank(*am).cmp(&mode_rank(*bm)))
    });

    let mut roots: Vec<(PathBuf, RecursiveMode)> = Vec::new();
    for (path, mode) in candidates {
        let covered = roots.iter().any(|(root, root_mode)| {
            root == &path
                || (*root_mode == RecursiveMode::Recursive && path.starts_with(root))
        });
        if !covered {
            roots.push((path, mode));
        }
    }
    roots
}

fn mode_rank(mode: RecursiveMode) -> u8 {
    match mode {
        RecursiveMode::Recursive => 0,
        RecursiveMode::NonRecursive => 1,
    }
}
