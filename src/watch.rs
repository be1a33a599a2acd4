//! Filesystem watching, debouncing and single-flight regeneration.
//!
//! ## Event Flow
//!
//! ```text
//! notify ──┐
//! ctrlc  ──┼──► EventStream (mpsc) ──► GalleryWatcher::run
//! tests  ──┘                              │
//!                                         ├─ image event → restart debounce deadline
//!                                         ├─ deadline passes → trigger()
//!                                         │     ├─ busy → skip (dropped, not queued)
//!                                         │     └─ idle → runner on a worker thread
//!                                         └─ Shutdown → cancel deadline, close watch
//! ```
//!
//! All watcher state (the debounce deadline and the busy flag) lives in one
//! [`GalleryWatcher`]. Time is passed in explicitly to [`GalleryWatcher::on_change`]
//! and [`GalleryWatcher::tick`], so the debounce and single-flight rules are
//! testable with synthetic events and instants.
//!
//! Shutdown stops watching and clears the pending deadline. An update that is
//! already running is left to finish on its own.

use crate::config::{GalleryConfig, RawConfig};
use crate::raw;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to watch {path}: {source}")]
    Notify {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
    #[error("Update executable not found: {0}")]
    MissingRunner(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Input to a watch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchMessage {
    /// Something under the watched path was created, modified or removed.
    Changed(PathBuf),
    Shutdown,
}

// ============================================================================
// Event source
// ============================================================================

/// Channel of [`WatchMessage`]s, optionally fed by a native recursive watch.
///
/// Without [`EventStream::watch`] it is a plain synthetic source: tests (and
/// the signal handler) push messages through [`EventStream::sender`].
pub struct EventStream {
    tx: Sender<WatchMessage>,
    rx: Receiver<WatchMessage>,
    watcher: Option<RecommendedWatcher>,
}

impl Default for EventStream {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStream {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            watcher: None,
        }
    }

    pub fn sender(&self) -> Sender<WatchMessage> {
        self.tx.clone()
    }

    /// Start forwarding filesystem notifications under `path`.
    pub fn watch(&mut self, path: &Path, recursive: bool) -> Result<(), WatchError> {
        let tx = self.tx.clone();
        let notify_err = |source: notify::Error| WatchError::Notify {
            path: path.to_path_buf(),
            source,
        };

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Access(_)) {
                    return;
                }
                for path in event.paths {
                    // Receiver gone means the loop already stopped.
                    let _ = tx.send(WatchMessage::Changed(path));
                }
            }
            Err(e) => warn!("Watch error: {}", e),
        })
        .map_err(notify_err)?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(path, mode).map_err(notify_err)?;

        info!("Watching {}", path.display());
        self.watcher = Some(watcher);
        Ok(())
    }

    /// Next message, waiting at most `timeout` (forever when `None`).
    ///
    /// Returns `Ok(None)` on timeout and `Err(())` once every sender is gone.
    fn next(&self, timeout: Option<Duration>) -> Result<Option<WatchMessage>, ()> {
        match timeout {
            Some(timeout) => match self.rx.recv_timeout(timeout) {
                Ok(msg) => Ok(Some(msg)),
                Err(RecvTimeoutError::Timeout) => Ok(None),
                Err(RecvTimeoutError::Disconnected) => Err(()),
            },
            None => self.rx.recv().map(Some).map_err(|_| ()),
        }
    }

    /// Drop the native watch, releasing its handles.
    pub fn close(&mut self) {
        if self.watcher.take().is_some() {
            info!("Stopped watching");
        }
    }
}

// ============================================================================
// Debounce
// ============================================================================

/// Trailing-edge debounce: fires once `delay` after the last touch.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Restart the quiet period at `now`, replacing any pending deadline.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the deadline, or `None` when nothing is pending.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Consume the deadline if it has passed.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Runs one gallery update to completion.
pub trait UpdateRunner: Send + Sync + 'static {
    /// Returns the exit code, or `None` if the update was killed by a signal.
    fn run(&self) -> std::io::Result<Option<i32>>;
}

/// Runs the update as a child process that inherits stdio.
#[derive(Debug, Clone)]
pub struct ChildProcessRunner {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: PathBuf,
}

impl ChildProcessRunner {
    pub fn new(
        program: PathBuf,
        args: Vec<OsString>,
        current_dir: PathBuf,
    ) -> Result<Self, WatchError> {
        if !program.is_file() {
            return Err(WatchError::MissingRunner(program));
        }
        Ok(Self {
            program,
            args,
            current_dir,
        })
    }
}

impl UpdateRunner for ChildProcessRunner {
    fn run(&self) -> std::io::Result<Option<i32>> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.current_dir)
            .status()?;
        Ok(status.code())
    }
}

// ============================================================================
// Gallery watcher
// ============================================================================

/// Result of a trigger attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Launched,
    /// An update was already running; this trigger was dropped.
    Skipped,
    /// The worker thread could not be started; nothing ran.
    Failed,
}

/// Result of a [`GalleryWatcher::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Idle,
    Fired(Trigger),
}

pub struct GalleryWatcher<R: UpdateRunner> {
    runner: Arc<R>,
    config: GalleryConfig,
    debounce: Debounce,
    updating: Arc<AtomicBool>,
}

impl<R: UpdateRunner> GalleryWatcher<R> {
    pub fn new(runner: R, config: GalleryConfig) -> Self {
        let debounce = Debounce::new(config.watch_delay());
        Self {
            runner: Arc::new(runner),
            config,
            debounce,
            updating: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_updating(&self) -> bool {
        self.updating.load(Ordering::SeqCst)
    }

    pub fn has_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Feed one filesystem change. Non-image paths are ignored.
    pub fn on_change(&mut self, path: &Path, now: Instant) {
        if !self.config.is_image_path(path) {
            debug!("Ignoring change to {}", path.display());
            return;
        }
        info!("Change detected: {}", path.display());
        self.debounce.touch(now);
    }

    /// Fire the pending update if its quiet period has elapsed by `now`.
    pub fn tick(&mut self, now: Instant) -> Tick {
        if self.debounce.fire_due(now) {
            Tick::Fired(self.trigger())
        } else {
            Tick::Idle
        }
    }

    /// Start an update unless one is already running.
    pub fn trigger(&self) -> Trigger {
        if self
            .updating
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("Update already in progress, skipping this trigger");
            return Trigger::Skipped;
        }

        info!("Starting gallery update");
        let runner = Arc::clone(&self.runner);
        let updating = Arc::clone(&self.updating);
        let spawned = thread::Builder::new()
            .name("gallery-update".to_string())
            .spawn(move || {
                let result = runner.run();
                updating.store(false, Ordering::SeqCst);
                match result {
                    Ok(Some(0)) => info!("Gallery update finished, watching for changes"),
                    Ok(Some(code)) => error!("Gallery update failed with exit code {}", code),
                    Ok(None) => error!("Gallery update terminated by signal"),
                    Err(e) => error!("Failed to run gallery update: {}", e),
                }
            });

        self.settle_spawn(spawned)
    }

    /// Map the worker spawn result to a [`Trigger`], releasing the busy flag
    /// when no worker exists to release it.
    fn settle_spawn(&self, spawned: std::io::Result<thread::JoinHandle<()>>) -> Trigger {
        match spawned {
            Ok(_) => Trigger::Launched,
            Err(e) => {
                self.updating.store(false, Ordering::SeqCst);
                error!("Failed to start gallery update: {}", e);
                Trigger::Failed
            }
        }
    }

    /// Run the initial update, watch `root` recursively, then loop until shutdown.
    pub fn start(&mut self, events: &mut EventStream, root: &Path) -> Result<(), WatchError> {
        info!("Running initial update");
        self.trigger();
        events.watch(root, true)?;
        self.run(events);
        Ok(())
    }

    /// Process messages until `Shutdown` or until every sender is gone.
    pub fn run(&mut self, events: &mut EventStream) {
        loop {
            let wait = self.debounce.remaining(Instant::now());
            match events.next(wait) {
                Ok(Some(WatchMessage::Changed(path))) => self.on_change(&path, Instant::now()),
                Ok(Some(WatchMessage::Shutdown)) => {
                    info!("Shutdown requested");
                    break;
                }
                Ok(None) => {}
                Err(()) => break,
            }
            self.tick(Instant::now());
        }
        self.debounce.cancel();
        events.close();
    }
}

// ============================================================================
// Raw comparisons
// ============================================================================

/// Resync the raw manifest on every `.jpg` change until shutdown.
///
/// There is no debounce here: each qualifying event rewrites the manifest.
/// Returns the number of resyncs performed.
pub fn run_raw_watch(events: &mut EventStream, dir: &Path, config: &RawConfig) -> usize {
    let mut syncs = 0;
    loop {
        match events.next(None) {
            Ok(Some(WatchMessage::Changed(path))) if raw::is_raw_trigger(&path) => {
                info!("Raw image changed: {}", path.display());
                match raw::sync_raw_pairs(dir, config) {
                    Ok(manifest) => info!(
                        "Updated {} ({} comparisons)",
                        config.manifest_file,
                        manifest.raw_comparisons.len()
                    ),
                    Err(e) => error!("Failed to update {}: {}", config.manifest_file, e),
                }
                syncs += 1;
            }
            Ok(Some(WatchMessage::Changed(_))) | Ok(None) => {}
            Ok(Some(WatchMessage::Shutdown)) => {
                info!("Shutdown requested");
                break;
            }
            Err(()) => break,
        }
    }
    events.close();
    syncs
}
