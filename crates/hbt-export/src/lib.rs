//! Export renderers for fetched blog entries.
//!
//! Formatters are pure transforms over an already-fetched entry
//! collection: they serialize to third-party interchange formats and
//! never talk to the network.

mod blogger;
mod movable_type;

use std::io::{self, Write};

use hbt_atompub::PostedEntry;

pub use blogger::BloggerFormatter;
pub use movable_type::MovableTypeFormatter;

/// Serializes a fetched entry collection to an export format.
pub trait EntryFormatter {
    /// Render `entries` to `out`.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the sink.
    fn format(&self, entries: &[PostedEntry], out: &mut dyn Write) -> io::Result<()>;
}
