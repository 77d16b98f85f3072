//! WSSE `UsernameToken` request signing.
//!
//! The Hatena AtomPub endpoint authenticates every request with an
//! `X-WSSE` header: a random nonce, a creation timestamp, and
//! `PasswordDigest = base64(sha1(nonce + created + api_key))`.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use chrono::{DateTime, SecondsFormat, Utc};
use rand::RngExt;
use sha1::{Digest, Sha1};

use crate::credential::Credential;

/// Build the `X-WSSE` header value for one request.
pub(crate) fn username_token(credential: &Credential) -> String {
    let nonce: [u8; 16] = rand::rng().random();
    username_token_with(credential, &nonce, Utc::now())
}

/// Header construction with injected nonce and timestamp.
fn username_token_with(
    credential: &Credential,
    nonce: &[u8],
    created: DateTime<Utc>,
) -> String {
    let created = created.to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut hasher = Sha1::new();
    hasher.update(nonce);
    hasher.update(created.as_bytes());
    hasher.update(credential.api_key().as_bytes());
    let digest = hasher.finalize();

    format!(
        r#"UsernameToken Username="{}", PasswordDigest="{}", Nonce="{}", Created="{}""#,
        credential.hatena_id(),
        BASE64_STANDARD.encode(digest),
        BASE64_STANDARD.encode(nonce),
        created,
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_username_token_digest() {
        let credential = Credential::new("someone", "someone.hatenablog.com", "apikey123");
        let created = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        let header = username_token_with(&credential, b"0123456789abcdef", created);

        assert_eq!(
            header,
            r#"UsernameToken Username="someone", PasswordDigest="Aur6TrvtD0OahKIRf3rbKAcohGw=", Nonce="MDEyMzQ1Njc4OWFiY2RlZg==", Created="2024-01-02T03:04:05Z""#
        );
    }

    #[test]
    fn test_nonce_uniqueness() {
        let credential = Credential::new("someone", "blog", "key");
        let first = username_token(&credential);
        let second = username_token(&credential);
        assert_ne!(first, second);
    }

    #[test]
    fn test_created_is_rfc3339_utc() {
        let credential = Credential::new("someone", "blog", "key");
        let header = username_token(&credential);
        let created = header
            .split(r#"Created=""#)
            .nth(1)
            .and_then(|rest| rest.strip_suffix('"'))
            .expect("header carries a Created field");
        assert!(created.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(created).is_ok());
    }
}
