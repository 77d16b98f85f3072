//! Blog entry model.

use chrono::{DateTime, FixedOffset};

/// Where a posted entry lives on the server.
///
/// Fixed when the entry is parsed out of a server response; these fields
/// identify the record, not its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLocation {
    /// Opaque Atom entry id (a `tag:` URI).
    pub id: String,
    /// Member URI (`link rel="edit"`); the target of update requests.
    pub member_uri: String,
    /// Public page URI (`link rel="alternate"`), absent for drafts that
    /// were never published.
    pub entry_uri: Option<String>,
}

/// A brand-new entry to be posted into the collection.
#[derive(Debug, Clone, Default)]
pub struct Entry {
    /// Entry title.
    pub title: String,
    /// Author names.
    pub authors: Vec<String>,
    /// Raw entry body in the syntax named by `content_type`.
    pub content: String,
    /// Content syntax marker (`text/x-hatena-syntax`, `text/x-markdown`, ...).
    pub content_type: Option<String>,
    /// Requested update timestamp; the server fills one in when absent.
    pub updated: Option<DateTime<FixedOffset>>,
    /// Ordered category tags; duplicates are allowed.
    pub categories: Vec<String>,
    /// Whether the entry is saved as a draft.
    pub is_draft: bool,
}

/// An entry fetched from the server.
///
/// Identity is immutable; the content fields may be edited in place and
/// written back through
/// [`HatenaBlogClient::update_entry`](crate::HatenaBlogClient::update_entry).
#[derive(Debug, Clone)]
pub struct PostedEntry {
    /// Identity and location of the record.
    pub location: EntryLocation,
    /// Entry title.
    pub title: String,
    /// Author names.
    pub authors: Vec<String>,
    /// Raw entry body; the field content edits apply to.
    pub content: String,
    /// Content syntax marker.
    pub content_type: Option<String>,
    /// Ordered category tags; duplicates are allowed.
    pub categories: Vec<String>,
    /// Whether the entry is a draft.
    pub is_draft: bool,
    /// First publication timestamp.
    pub published: Option<DateTime<FixedOffset>>,
    /// Last update timestamp.
    pub updated: Option<DateTime<FixedOffset>>,
    /// Server-rendered display form of `content`. Derived data: edits
    /// apply to `content`, and this field is never sent back on update.
    pub formatted_content: Option<String>,
}

impl PostedEntry {
    /// Author names joined for single-line display.
    #[must_use]
    pub fn author_line(&self) -> String {
        self.authors.join(" ")
    }
}
