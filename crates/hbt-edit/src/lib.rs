//! Batch editing of blog entries.
//!
//! Walks every entry of a blog exactly once, applies a pluggable
//! [`EntryEditor`], renders a human-reviewable diff for each change, and
//! decides per [`PostMode`] whether to write the result back. Dry runs
//! make byte-identical decisions to real runs; the only difference is
//! that nothing is committed.
//!
//! The pipeline is strictly sequential: one entry is fully processed
//! before the next is fetched, and a single entry's write failure never
//! aborts the run.

mod diff;
mod editor;
mod pipeline;

pub use diff::{CommandDiff, DiffGenerator, NullDiff, UnifiedDiff};
pub use editor::{EntryEditor, RegexReplaceEditor, ReplaceEditor};
pub use pipeline::{
    BatchEdit, CancelFlag, CommitFailure, EntrySource, PostMode, RunError, RunSummary,
};
