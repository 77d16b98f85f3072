//! Error types for the AtomPub client.

/// Error while parsing an Atom feed or entry document.
///
/// Distinct from transport failures: a parse failure means the response
/// arrived but cannot be trusted, so a traversal built on it must stop.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FeedParseError {
    /// XML parsing error.
    #[error("XML parse error")]
    Xml(#[from] quick_xml::Error),

    /// Encoding error during XML parsing.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// XML attribute error.
    #[error("XML attribute error")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// A required element or attribute is absent.
    #[error("missing {0} in Atom document")]
    MissingElement(&'static str),

    /// A timestamp element does not hold an RFC 3339 value.
    #[error("invalid timestamp in <{element}>: {value}")]
    InvalidTimestamp {
        /// Element name (`published`, `updated`).
        element: &'static str,
        /// The offending text.
        value: String,
    },
}

/// Error from AtomPub operations.
#[derive(Debug, thiserror::Error)]
pub enum AtomPubError {
    /// The service rejected the credential.
    #[error("authentication rejected (HTTP {status})")]
    Authentication {
        /// HTTP status of the rejection (401 or 403).
        status: u16,
    },

    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Malformed feed or entry document.
    #[error("malformed Atom document")]
    Parse(#[from] FeedParseError),

    /// I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
