//! The batch edit pipeline.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use hbt_atompub::{AtomPubError, HatenaBlogClient, PostedEntry};

use crate::diff::DiffGenerator;
use crate::editor::EntryEditor;

/// Run-wide policy for writing visited entries back.
///
/// Fixed for the whole run; no per-entry override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostMode {
    /// Write every visited entry back, changed or not.
    ///
    /// Unchanged entries carry no content delta; writing them anyway is
    /// the supported way to force a server-side refresh of entry metadata
    /// and rendered content.
    Always,
    /// Write back only entries the editor reported as changed.
    IfModified,
    /// Dry run: edit and diff every entry, write nothing.
    Never,
}

/// Source of entries for a batch run.
///
/// Implemented by [`HatenaBlogClient`]; tests substitute in-memory fakes.
pub trait EntrySource {
    /// Lazy traversal of every entry, in server order.
    fn entries<'a>(&'a self) -> Box<dyn Iterator<Item = Result<PostedEntry, AtomPubError>> + 'a>;

    /// Replace-style write of one entry.
    ///
    /// # Errors
    ///
    /// Returns the HTTP-level cause when the server rejects the write.
    fn update_entry(&self, entry: &PostedEntry) -> Result<PostedEntry, AtomPubError>;
}

impl EntrySource for HatenaBlogClient {
    fn entries<'a>(&'a self) -> Box<dyn Iterator<Item = Result<PostedEntry, AtomPubError>> + 'a> {
        Box::new(HatenaBlogClient::entries(self))
    }

    fn update_entry(&self, entry: &PostedEntry) -> Result<PostedEntry, AtomPubError> {
        HatenaBlogClient::update_entry(self, entry)
    }
}

/// Cooperative cancellation flag, observed at entry boundaries.
///
/// Cancelling stops the run before the next entry is fetched; the entry
/// being processed completes, and the summary for work already done is
/// still produced.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A fresh, uncancelled flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One entry's failed write.
#[derive(Debug)]
pub struct CommitFailure {
    /// Atom id of the entry whose update was rejected.
    pub id: String,
    /// HTTP-level cause.
    pub error: AtomPubError,
}

/// Counts and per-entry failures of one batch run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Entries fetched and edited.
    pub visited: usize,
    /// Entries the editor reported as changed.
    pub changed: usize,
    /// Entries written back successfully.
    pub committed: usize,
    /// Changed entries not written because of [`PostMode::Never`].
    pub skipped: usize,
    /// Entries whose write was rejected; the run continued past them.
    pub failed: Vec<CommitFailure>,
    /// Whether the run stopped at a cancellation point.
    pub cancelled: bool,
}

/// Pipeline failure.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The configured diff generator cannot run; the traversal never
    /// starts.
    #[error("diff tool is not available")]
    DiffToolUnavailable,

    /// Fetching or parsing the entry sequence failed mid-run. `summary`
    /// covers the entries processed before the fault.
    #[error("entry traversal aborted")]
    Aborted {
        /// The fatal transport or parse failure.
        #[source]
        fault: AtomPubError,
        /// Partial results gathered before the abort.
        summary: RunSummary,
    },

    /// Writing a diff to the output sink failed.
    #[error("diff output failed")]
    DiffOutput {
        /// The underlying I/O failure.
        #[source]
        fault: std::io::Error,
        /// Partial results gathered before the failure.
        summary: RunSummary,
    },
}

/// Walks every entry of a source exactly once: edit, diff, maybe commit.
///
/// Strictly sequential: one entry is fully processed before the next is
/// fetched, keeping writes ordered and diff output aligned with the
/// traversal. The whole run is one blocking call.
pub struct BatchEdit<'a> {
    source: &'a dyn EntrySource,
    post_mode: PostMode,
    cancel: CancelFlag,
}

impl<'a> BatchEdit<'a> {
    /// A batch edit over `source` with the given post mode.
    #[must_use]
    pub fn new(source: &'a dyn EntrySource, post_mode: PostMode) -> Self {
        Self {
            source,
            post_mode,
            cancel: CancelFlag::new(),
        }
    }

    /// Observe an externally owned cancellation flag.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the pipeline to completion and return the summary.
    ///
    /// Every changed entry is diffed to `diff_out`, whatever the post
    /// mode: a dry run shows exactly what a real run would commit.
    /// Unchanged entries are neither diffed nor written under
    /// [`PostMode::IfModified`] and [`PostMode::Never`].
    ///
    /// # Errors
    ///
    /// [`RunError::DiffToolUnavailable`] before traversal when the diff
    /// precondition fails; [`RunError::Aborted`] when pagination fails
    /// mid-run. Per-entry write failures are not errors; they land in
    /// [`RunSummary::failed`].
    pub fn run(
        &self,
        editor: &dyn EntryEditor,
        diff: &dyn DiffGenerator,
        diff_out: &mut dyn Write,
    ) -> Result<RunSummary, RunError> {
        if !diff.is_available() {
            return Err(RunError::DiffToolUnavailable);
        }

        let mut summary = RunSummary::default();
        let mut entries = self.source.entries();

        loop {
            if self.cancel.is_cancelled() {
                info!("cancellation requested, stopping before the next entry");
                summary.cancelled = true;
                break;
            }
            let Some(fetched) = entries.next() else { break };
            let mut entry = match fetched {
                Ok(entry) => entry,
                Err(fault) => return Err(RunError::Aborted { fault, summary }),
            };

            summary.visited += 1;
            info!("editing {}", entry.location.id);

            let mut change: Option<(String, String)> = None;
            let changed = editor.edit(&mut entry, &mut |before, after| {
                change = Some((before.to_owned(), after.to_owned()));
            });

            if changed {
                summary.changed += 1;
                if let Some((before, after)) = &change {
                    if let Err(fault) = diff.generate(before, after, diff_out) {
                        return Err(RunError::DiffOutput { fault, summary });
                    }
                }
            }

            // The editor's signal decides, not a content re-comparison
            let commit = match self.post_mode {
                PostMode::Always => true,
                PostMode::IfModified => changed,
                PostMode::Never => false,
            };

            if commit {
                match self.source.update_entry(&entry) {
                    Ok(_updated) => summary.committed += 1,
                    Err(error) => {
                        warn!("failed to update {}: {error}", entry.location.id);
                        summary.failed.push(CommitFailure {
                            id: entry.location.id.clone(),
                            error,
                        });
                    }
                }
            } else if changed {
                summary.skipped += 1;
            }
        }

        Ok(summary)
    }
}
