//! Background find/replace in files.
//!
//! A [`FindWorker`] owns one thread that reads files from disk (never the live buffers),
//! matches them line by line and posts one [`FindEvent`] per processed file over a
//! channel. The UI thread drains events on its own schedule.
//!
//! Cancellation is cooperative: the flag is checked before each file. There is no timeout.

use crate::coord::CharRange;
use crate::encoding::EncodingOptions;
use crate::file_format::split_lines;
use crate::file_io::{read_text_file, write_text_file};
use crate::find::{FindOptions, Matcher};
use crate::options::{Context, FindWorkerOptions};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// What to search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindTarget {
    /// An explicit list of files.
    Files(Vec<PathBuf>),
    /// A folder, walked recursively.
    Folder {
        /// Root folder.
        path: PathBuf,
        /// Only files with one of these extensions (without the dot); empty means all.
        extensions: Vec<String>,
    },
}

/// A find (or replace) in files request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindRequest {
    /// The pattern.
    pub pattern: String,
    /// Search flags. `reverse` and `cycle` are ignored.
    pub options: FindOptions,
    /// Files to process.
    pub target: FindTarget,
    /// When set, every match is replaced and matching files are rewritten.
    pub replacement: Option<String>,
}

/// One match in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatch {
    /// 1-based line number.
    pub line: usize,
    /// Matched columns.
    pub range: CharRange,
    /// The text of the line (before replacement).
    pub text: String,
}

/// Events posted by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindEvent {
    /// A file was processed.
    File {
        /// The file.
        path: PathBuf,
        /// Matches (or replacements) found in this file.
        new_match_count: usize,
        /// The matches, in document order.
        matches: Vec<FileMatch>,
    },
    /// A file could not be processed.
    Failed {
        /// The file.
        path: PathBuf,
        /// What went wrong.
        error: String,
    },
    /// The worker stopped. Always the last event.
    Finished {
        /// Stopped early because of [`FindWorker::cancel`].
        cancelled: bool,
    },
}

/// Wakes the host's event loop after an event is posted.
pub trait WakeupSignal: Send {
    /// Request a drain of the event queue.
    fn signal(&self);
}

impl<F: Fn() + Send> WakeupSignal for F {
    fn signal(&self) {
        self()
    }
}

/// Handle to a running find-in-files thread.
///
/// Dropping the handle cancels the search and joins the thread.
#[derive(Debug)]
pub struct FindWorker {
    cancel: Arc<AtomicBool>,
    events: Receiver<FindEvent>,
    thread: Option<JoinHandle<()>>,
}

impl FindWorker {
    /// Start a search. Returns `None` if the pattern is empty or does not compile.
    pub fn spawn(
        context: Arc<Context>,
        request: FindRequest,
        waker: Option<Box<dyn WakeupSignal>>,
    ) -> Option<Self> {
        let matcher = Matcher::new(&request.pattern, &request.options)?;
        let (tx, rx) = unbounded();
        let cancel = Arc::new(AtomicBool::new(false));

        let job = Job {
            matcher,
            request,
            worker: context.options.find_worker.clone(),
            encoding: context.options.encoding,
            cancel: Arc::clone(&cancel),
            tx,
            waker,
        };
        let thread = thread::Builder::new()
            .name("find-in-files".into())
            .spawn(move || job.run());
        match thread {
            Ok(thread) => Some(Self {
                cancel,
                events: rx,
                thread: Some(thread),
            }),
            Err(err) => {
                tracing::error!(error = %err, "failed to start find worker");
                None
            }
        }
    }

    /// Ask the worker to stop before the next file.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Returns `true` if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// The next event, if one is queued.
    pub fn try_recv(&self) -> Option<FindEvent> {
        self.events.try_recv().ok()
    }

    /// All queued events.
    pub fn drain(&self) -> Vec<FindEvent> {
        self.events.try_iter().collect()
    }

    /// The event receiver, for blocking or `select!`-based consumers.
    pub fn events(&self) -> &Receiver<FindEvent> {
        &self.events
    }

    /// Wait for the thread to exit.
    pub fn join(mut self) {
        self.join_thread();
    }

    fn join_thread(&mut self) {
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::error!("find worker panicked");
        }
    }
}

impl Drop for FindWorker {
    fn drop(&mut self) {
        self.cancel();
        self.join_thread();
    }
}

struct Job {
    matcher: Matcher,
    request: FindRequest,
    worker: FindWorkerOptions,
    encoding: EncodingOptions,
    cancel: Arc<AtomicBool>,
    tx: Sender<FindEvent>,
    waker: Option<Box<dyn WakeupSignal>>,
}

impl Job {
    fn post(&self, event: FindEvent) -> bool {
        let sent = self.tx.send(event).is_ok();
        if let Some(waker) = &self.waker {
            waker.signal();
        }
        sent
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn run(self) {
        tracing::info!(
            pattern = %self.request.pattern,
            replace = self.request.replacement.is_some(),
            "find in files started"
        );
        let mut files = 0usize;
        let mut cancelled = false;

        let mut visit = |path: &Path| -> bool {
            if self.cancelled() {
                cancelled = true;
                return false;
            }
            files += 1;
            let event = self.process(path);
            // A closed channel means nobody is listening any more.
            self.post(event)
        };

        match &self.request.target {
            FindTarget::Files(paths) => {
                for path in paths {
                    if !visit(path) {
                        break;
                    }
                }
            }
            FindTarget::Folder { path, extensions } => {
                let walker = ignore::WalkBuilder::new(path)
                    .hidden(!self.worker.hidden)
                    .follow_links(self.worker.follow_links)
                    .git_ignore(self.worker.respect_ignore_files)
                    .ignore(self.worker.respect_ignore_files)
                    .build();
                for entry in walker {
                    let entry = match entry {
                        Ok(entry) => entry,
                        Err(err) => {
                            tracing::warn!(error = %err, "skipping unreadable entry");
                            continue;
                        }
                    };
                    if !entry.file_type().is_some_and(|t| t.is_file()) {
                        continue;
                    }
                    if !has_extension(entry.path(), extensions) {
                        continue;
                    }
                    if !visit(entry.path()) {
                        break;
                    }
                }
            }
        }

        if cancelled {
            tracing::info!(files, "find in files cancelled");
        } else {
            tracing::info!(files, "find in files finished");
        }
        self.post(FindEvent::Finished { cancelled });
    }

    fn process(&self, path: &Path) -> FindEvent {
        match self.search_file(path) {
            Ok((count, matches)) => FindEvent::File {
                path: path.to_path_buf(),
                new_match_count: count,
                matches,
            },
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "find in file failed");
                FindEvent::Failed {
                    path: path.to_path_buf(),
                    error,
                }
            }
        }
    }

    fn search_file(&self, path: &Path) -> Result<(usize, Vec<FileMatch>), String> {
        let size = std::fs::metadata(path).map_err(|e| e.to_string())?.len();
        if size > self.worker.max_file_size {
            return Err(format!("file too large ({size} bytes)"));
        }
        let file = read_text_file(path, &self.encoding).map_err(|e| e.to_string())?;

        let mut matches = Vec::new();
        let lines = split_lines(&file.text);
        for (i, line) in lines.iter().enumerate() {
            for range in self.matcher.find_all_in_line(line, CharRange::whole_line()) {
                matches.push(FileMatch {
                    line: i + 1,
                    range,
                    text: (*line).to_string(),
                });
            }
        }

        if let Some(replacement) = &self.request.replacement
            && !matches.is_empty()
        {
            let format = file.file_format.unwrap_or_default();
            let replaced: Vec<String> = lines
                .iter()
                .map(|line| self.matcher.replace_line(line, replacement).0)
                .collect();
            let text = format.join(replaced.iter().map(String::as_str));
            write_text_file(path, &text, file.encoding).map_err(|e| e.to_string())?;
            tracing::debug!(path = %path.display(), count = matches.len(), "replaced in file");
        }

        Ok((matches.len(), matches))
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_filter() {
        let exts = vec!["rs".to_string(), "TOML".to_string()];
        assert!(has_extension(Path::new("a/b.rs"), &exts));
        assert!(has_extension(Path::new("Cargo.toml"), &exts));
        assert!(!has_extension(Path::new("README"), &exts));
        assert!(has_extension(Path::new("README"), &[]));
    }

    #[test]
    fn test_invalid_pattern_does_not_spawn() {
        let request = FindRequest {
            pattern: "(".into(),
            options: FindOptions {
                use_regex: true,
                ..FindOptions::default()
            },
            target: FindTarget::Files(Vec::new()),
            replacement: None,
        };
        assert!(FindWorker::spawn(Context::shared_default(), request, None).is_none());
    }
}
