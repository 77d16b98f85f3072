//! Blog identity and API key.

use std::fmt;

/// Identity and API key for one Hatena Blog.
///
/// Immutable after construction. The API key is the AtomPub key from the
/// blog's advanced settings page, not the account password. Callers are
/// expected to hand in non-empty fields; validation lives at the
/// configuration boundary.
#[derive(Clone)]
pub struct Credential {
    hatena_id: String,
    blog_id: String,
    api_key: String,
}

impl Credential {
    /// Bundle a credential from its three parts.
    #[must_use]
    pub fn new(hatena_id: &str, blog_id: &str, api_key: &str) -> Self {
        Self {
            hatena_id: hatena_id.to_owned(),
            blog_id: blog_id.to_owned(),
            api_key: api_key.to_owned(),
        }
    }

    /// Hatena account id.
    #[must_use]
    pub fn hatena_id(&self) -> &str {
        &self.hatena_id
    }

    /// Blog domain name (`xxx.hatenablog.com`, `xxx.hateblo.jp`, ...).
    #[must_use]
    pub fn blog_id(&self) -> &str {
        &self.blog_id
    }

    /// AtomPub API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// AtomPub service root for this blog.
    #[must_use]
    pub fn service_root(&self) -> String {
        format!(
            "https://blog.hatena.ne.jp/{}/{}/atom",
            self.hatena_id, self.blog_id
        )
    }

    /// Member collection URI (the paginated entry listing).
    #[must_use]
    pub fn collection_uri(&self) -> String {
        format!("{}/entry", self.service_root())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("hatena_id", &self.hatena_id)
            .field("blog_id", &self.blog_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        Credential::new("someone", "someone.hatenablog.com", "k3y")
    }

    #[test]
    fn test_service_root() {
        assert_eq!(
            credential().service_root(),
            "https://blog.hatena.ne.jp/someone/someone.hatenablog.com/atom"
        );
    }

    #[test]
    fn test_collection_uri() {
        assert_eq!(
            credential().collection_uri(),
            "https://blog.hatena.ne.jp/someone/someone.hatenablog.com/atom/entry"
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let debug = format!("{:?}", credential());
        assert!(!debug.contains("k3y"));
        assert!(debug.contains("someone"));
    }
}
