//! Hatena Blog AtomPub protocol client.
//!
//! Provides a sync HTTP client for the Hatena Blog AtomPub interface with
//! WSSE `UsernameToken` authentication: login, lazy paginated entry
//! enumeration, and single-entry get/update/create.
//!
//! The client owns its session context (credential plus HTTP agent); there
//! is no process-wide state. Entries come back as [`PostedEntry`] values
//! whose identity is fixed at parse time and whose content fields are free
//! to mutate before an update.

mod client;
mod credential;
mod entry;
mod error;
pub mod feed;
mod wsse;

pub use client::{Entries, HatenaBlogClient};
pub use credential::Credential;
pub use entry::{Entry, EntryLocation, PostedEntry};
pub use error::{AtomPubError, FeedParseError};
