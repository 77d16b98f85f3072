//! Synchronous AtomPub client for one Hatena Blog.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::{debug, info};
use ureq::Agent;

use crate::credential::Credential;
use crate::entry::{Entry, PostedEntry};
use crate::error::AtomPubError;
use crate::feed::{self, Feed};
use crate::wsse;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

const USER_AGENT: &str = concat!("hatena-blog-tools/", env!("CARGO_PKG_VERSION"));

/// AtomPub client bound to one blog.
///
/// Owns the whole session context: the credential and the HTTP agent. A
/// fresh WSSE header is derived from the cached credential material for
/// every request; nothing here is process-global.
pub struct HatenaBlogClient {
    agent: Agent,
    credential: Credential,
}

impl HatenaBlogClient {
    /// Create a client for the blog the credential names.
    #[must_use]
    pub fn new(credential: Credential) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .user_agent(USER_AGENT)
            .build()
            .into();

        Self { agent, credential }
    }

    /// The credential this client signs requests with.
    #[must_use]
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Verify the credential against the service root.
    ///
    /// Must succeed before any other operation is attempted. One request,
    /// no retry: a rejection ends the run before it starts.
    ///
    /// # Errors
    ///
    /// [`AtomPubError::Authentication`] when the service rejects the
    /// credential, [`AtomPubError::HttpRequest`] on transport failure.
    pub fn login(&self) -> Result<(), AtomPubError> {
        let url = self.credential.service_root();
        info!("logging in to {url}");

        let (status, body) = self.get(&url)?;
        match status {
            200 => Ok(()),
            401 | 403 => Err(AtomPubError::Authentication { status }),
            _ => Err(AtomPubError::HttpResponse { status, body }),
        }
    }

    /// Lazily enumerate every entry of the blog, in server order.
    ///
    /// Fetches one feed page at a time and follows `rel="next"` links
    /// until a page carries none. The traversal is finite, forward-only,
    /// and not restartable mid-way; it fuses after the first fatal error.
    /// Consumers may stop early without fetching the remaining pages.
    #[must_use]
    pub fn entries(&self) -> Entries<'_> {
        let first_page = self.credential.collection_uri();
        Entries(EntryPages::new(
            first_page,
            Box::new(move |url: &str| self.fetch_page(url)),
        ))
    }

    /// Fetch and parse a single entry resource.
    ///
    /// # Errors
    ///
    /// [`AtomPubError::HttpResponse`] for an error status,
    /// [`AtomPubError::Parse`] for a malformed body.
    pub fn get_entry(&self, member_uri: &str) -> Result<PostedEntry, AtomPubError> {
        debug!("fetching entry {member_uri}");

        let (status, body) = self.get(member_uri)?;
        if status >= 400 {
            return Err(AtomPubError::HttpResponse { status, body });
        }
        Ok(feed::parse_entry(&body)?)
    }

    /// Write an entry's editable fields back to its member URI.
    ///
    /// Returns the server's authoritative post-update representation;
    /// timestamps and the rendered content may differ from what was sent.
    ///
    /// # Errors
    ///
    /// [`AtomPubError::HttpResponse`] identifies the HTTP-level cause
    /// (expired session, not found, conflict, server error);
    /// [`AtomPubError::HttpRequest`] covers transient network failure.
    pub fn update_entry(&self, entry: &PostedEntry) -> Result<PostedEntry, AtomPubError> {
        let member_uri = &entry.location.member_uri;
        info!("updating entry {member_uri}");

        let document = feed::update_document(entry);
        let response = self
            .agent
            .put(member_uri)
            .header("X-WSSE", &wsse::username_token(&self.credential))
            .header("Content-Type", "application/xml")
            .send(document.as_bytes())?;

        let status = response.status().as_u16();
        let body = response.into_body().read_to_string()?;
        if status >= 400 {
            return Err(AtomPubError::HttpResponse { status, body });
        }
        Ok(feed::parse_entry(&body)?)
    }

    /// Post a brand-new entry into the member collection.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::update_entry`].
    pub fn create_entry(&self, entry: &Entry) -> Result<PostedEntry, AtomPubError> {
        let collection_uri = self.credential.collection_uri();
        info!("creating entry in {collection_uri}");

        let document = feed::create_document(entry);
        let response = self
            .agent
            .post(&collection_uri)
            .header("X-WSSE", &wsse::username_token(&self.credential))
            .header("Content-Type", "application/xml")
            .send(document.as_bytes())?;

        let status = response.status().as_u16();
        let body = response.into_body().read_to_string()?;
        if status >= 400 {
            return Err(AtomPubError::HttpResponse { status, body });
        }
        Ok(feed::parse_entry(&body)?)
    }

    fn fetch_page(&self, url: &str) -> Result<Feed, AtomPubError> {
        debug!("fetching feed page {url}");

        let (status, body) = self.get(url)?;
        if status >= 400 {
            return Err(AtomPubError::HttpResponse { status, body });
        }
        Ok(feed::parse_feed(&body)?)
    }

    fn get(&self, url: &str) -> Result<(u16, String), AtomPubError> {
        let response = self
            .agent
            .get(url)
            .header("X-WSSE", &wsse::username_token(&self.credential))
            .call()?;

        let status = response.status().as_u16();
        let body = response.into_body().read_to_string()?;
        Ok((status, body))
    }
}

type PageFetch<'a> = Box<dyn FnMut(&str) -> Result<Feed, AtomPubError> + 'a>;

/// Lazy iterator over every entry of the collection.
///
/// See [`HatenaBlogClient::entries`].
pub struct Entries<'a>(EntryPages<PageFetch<'a>>);

impl Iterator for Entries<'_> {
    type Item = Result<PostedEntry, AtomPubError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

/// Page-by-page traversal over an injected fetch function.
///
/// Separate from the HTTP client so ordering and fetch-count behavior can
/// be exercised without a network.
struct EntryPages<F> {
    fetch: F,
    next_url: Option<String>,
    queue: VecDeque<PostedEntry>,
    done: bool,
}

impl<F> EntryPages<F>
where
    F: FnMut(&str) -> Result<Feed, AtomPubError>,
{
    fn new(first_url: String, fetch: F) -> Self {
        Self {
            fetch,
            next_url: Some(first_url),
            queue: VecDeque::new(),
            done: false,
        }
    }
}

impl<F> Iterator for EntryPages<F>
where
    F: FnMut(&str) -> Result<Feed, AtomPubError>,
{
    type Item = Result<PostedEntry, AtomPubError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            if let Some(entry) = self.queue.pop_front() {
                return Some(Ok(entry));
            }
            let Some(url) = self.next_url.take() else {
                self.done = true;
                return None;
            };
            match (self.fetch)(&url) {
                Ok(page) => {
                    self.next_url = page.next_page;
                    self.queue.extend(page.entries);
                }
                Err(err) => {
                    // Traversal state cannot be trusted past a failed page
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}
