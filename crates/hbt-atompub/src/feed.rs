//! Atom feed and entry documents: parsing and serialization.
//!
//! The Hatena feed family uses the Atom namespace as the default, with
//! `app:` (AtomPub) and `hatena:` prefixed extensions. Documents are read
//! into a lightweight element tree first, then mapped onto the entry
//! model; update/create bodies are written with hand-rolled escaping.

use std::collections::HashMap;
use std::fmt::Write;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::entry::{Entry, EntryLocation, PostedEntry};
use crate::error::FeedParseError;

/// One page of the member collection.
#[derive(Debug)]
pub struct Feed {
    /// Entries in server-declared order.
    pub entries: Vec<PostedEntry>,
    /// `rel="next"` continuation link; absent on the last page.
    pub next_page: Option<String>,
}

/// Parse one feed page.
///
/// # Errors
///
/// Returns [`FeedParseError`] when the document is not a well-formed Atom
/// feed or any entry in it is missing its identity.
pub fn parse_feed(xml: &str) -> Result<Feed, FeedParseError> {
    let root = parse_document(xml)?;
    if root.name != "feed" {
        return Err(FeedParseError::MissingElement("<feed> root"));
    }

    let next_page = root.link("next").map(str::to_owned);
    let entries = root
        .children_named("entry")
        .map(entry_from_element)
        .collect::<Result<_, _>>()?;

    Ok(Feed { entries, next_page })
}

/// Parse a single-entry document (the body of get/update/create responses).
///
/// # Errors
///
/// Returns [`FeedParseError`] when the document is not a well-formed Atom
/// entry or is missing its identity.
pub fn parse_entry(xml: &str) -> Result<PostedEntry, FeedParseError> {
    let root = parse_document(xml)?;
    if root.name != "entry" {
        return Err(FeedParseError::MissingElement("<entry> root"));
    }
    entry_from_element(&root)
}

fn entry_from_element(elem: &XmlElement) -> Result<PostedEntry, FeedParseError> {
    let id = elem
        .child_text("id")
        .filter(|id| !id.is_empty())
        .ok_or(FeedParseError::MissingElement("<id>"))?
        .to_owned();
    let member_uri = elem
        .link("edit")
        .ok_or(FeedParseError::MissingElement(r#"<link rel="edit">"#))?
        .to_owned();
    let entry_uri = elem.link("alternate").map(str::to_owned);

    let (content, content_type) = match elem.child("content") {
        Some(content) => (content.text.clone(), content.attr("type").map(str::to_owned)),
        None => (String::new(), None),
    };

    let is_draft = elem
        .child("app:control")
        .and_then(|control| control.child_text("app:draft"))
        .map(str::trim)
        == Some("yes");

    Ok(PostedEntry {
        location: EntryLocation {
            id,
            member_uri,
            entry_uri,
        },
        title: elem.child_text("title").unwrap_or_default().to_owned(),
        authors: elem
            .children_named("author")
            .filter_map(|author| author.child_text("name"))
            .map(|name| name.trim().to_owned())
            .collect(),
        content,
        content_type,
        categories: elem
            .children_named("category")
            .filter_map(|category| category.attr("term"))
            .map(str::to_owned)
            .collect(),
        is_draft,
        published: timestamp(elem, "published")?,
        updated: timestamp(elem, "updated")?,
        formatted_content: elem
            .child_text("hatena:formatted-content")
            .map(str::to_owned),
    })
}

fn timestamp(
    elem: &XmlElement,
    element: &'static str,
) -> Result<Option<DateTime<FixedOffset>>, FeedParseError> {
    match elem.child_text(element) {
        None => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(value.trim()).map(Some).map_err(|_| {
            FeedParseError::InvalidTimestamp {
                element,
                value: value.to_owned(),
            }
        }),
    }
}

/// Serialize a posted entry's editable fields into an update body.
///
/// Identity, `published`, and the server-derived formatted content are
/// not part of the body: a replace-style write carries editable fields
/// only.
#[must_use]
pub fn update_document(entry: &PostedEntry) -> String {
    entry_document(
        &entry.title,
        &entry.authors,
        &entry.content,
        entry.content_type.as_deref(),
        entry.updated,
        &entry.categories,
        entry.is_draft,
    )
}

/// Serialize a new entry into a create body.
#[must_use]
pub fn create_document(entry: &Entry) -> String {
    entry_document(
        &entry.title,
        &entry.authors,
        &entry.content,
        entry.content_type.as_deref(),
        entry.updated,
        &entry.categories,
        entry.is_draft,
    )
}

fn entry_document(
    title: &str,
    authors: &[String],
    content: &str,
    content_type: Option<&str>,
    updated: Option<DateTime<FixedOffset>>,
    categories: &[String],
    is_draft: bool,
) -> String {
    let mut out = String::with_capacity(content.len() + 512);
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str(concat!(
        "<entry xmlns=\"http://www.w3.org/2005/Atom\"",
        " xmlns:app=\"http://www.w3.org/2007/app\">\n"
    ));

    writeln!(out, "  <title>{}</title>", escape_text(title)).unwrap();
    for author in authors {
        writeln!(
            out,
            "  <author><name>{}</name></author>",
            escape_text(author)
        )
        .unwrap();
    }

    match content_type {
        Some(content_type) => writeln!(
            out,
            "  <content type=\"{}\">{}</content>",
            escape_attr(content_type),
            escape_text(content)
        )
        .unwrap(),
        None => writeln!(out, "  <content>{}</content>", escape_text(content)).unwrap(),
    }

    if let Some(updated) = updated {
        writeln!(
            out,
            "  <updated>{}</updated>",
            updated.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
        .unwrap();
    }

    for category in categories {
        writeln!(out, "  <category term=\"{}\" />", escape_attr(category)).unwrap();
    }

    writeln!(
        out,
        "  <app:control><app:draft>{}</app:draft></app:control>",
        if is_draft { "yes" } else { "no" }
    )
    .unwrap();

    out.push_str("</entry>\n");
    out
}

/// Escape text for XML content.
pub(crate) fn escape_text(text: &str) -> String {
    escape_xml(text, false)
}

/// Escape text for XML attribute values.
pub(crate) fn escape_attr(text: &str) -> String {
    escape_xml(text, true)
}

fn escape_xml(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if escape_quotes => result.push_str("&quot;"),
            '\'' if escape_quotes => result.push_str("&apos;"),
            _ => result.push(ch),
        }
    }
    result
}

/// Lightweight XML element tree; qualified names are kept verbatim.
#[derive(Debug, Default)]
struct XmlElement {
    name: String,
    attrs: HashMap<String, String>,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|child| child.text.as_str())
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// `href` of the first `<link>` child with the given `rel`.
    fn link(&self, rel: &str) -> Option<&str> {
        self.children_named("link")
            .find(|link| link.attr("rel") == Some(rel))
            .and_then(|link| link.attr("href"))
    }
}

fn parse_document(xml: &str) -> Result<XmlElement, FeedParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = decode_name(&reader, e.name().as_ref());
                let attrs = decode_attrs(&reader, &e)?;
                let mut root = parse_children(&mut reader, &name)?;
                root.name = name;
                root.attrs = attrs;
                return Ok(root);
            }
            Event::Empty(e) => {
                return Ok(XmlElement {
                    name: decode_name(&reader, e.name().as_ref()),
                    attrs: decode_attrs(&reader, &e)?,
                    ..XmlElement::default()
                });
            }
            Event::Eof => return Err(FeedParseError::MissingElement("document root")),
            Event::Text(_)
            | Event::CData(_)
            | Event::GeneralRef(_)
            | Event::End(_)
            | Event::Comment(_)
            | Event::Decl(_)
            | Event::PI(_)
            | Event::DocType(_) => {}
        }
        buf.clear();
    }
}

fn parse_children(
    reader: &mut Reader<&[u8]>,
    parent_name: &str,
) -> Result<XmlElement, FeedParseError> {
    let mut buf = Vec::new();
    let mut node = XmlElement::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = decode_name(reader, e.name().as_ref());
                let attrs = decode_attrs(reader, &e)?;
                let mut child = parse_children(reader, &name)?;
                child.name = name;
                child.attrs = attrs;
                node.children.push(child);
            }
            Event::Empty(e) => {
                node.children.push(XmlElement {
                    name: decode_name(reader, e.name().as_ref()),
                    attrs: decode_attrs(reader, &e)?,
                    ..XmlElement::default()
                });
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?;
                node.text.push_str(&text);
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?;
                node.text.push_str(&decode_entity(&entity));
            }
            Event::CData(e) => {
                node.text.push_str(&String::from_utf8_lossy(&e));
            }
            Event::End(e) => {
                if decode_name(reader, e.name().as_ref()) == parent_name {
                    return Ok(node);
                }
            }
            Event::Eof => return Ok(node),
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
        buf.clear();
    }
}

fn decode_name(reader: &Reader<&[u8]>, name: &[u8]) -> String {
    reader.decoder().decode(name).map_or_else(
        |_| String::from_utf8_lossy(name).into_owned(),
        std::borrow::Cow::into_owned,
    )
}

fn decode_attrs(
    reader: &Reader<&[u8]>,
    e: &BytesStart,
) -> Result<HashMap<String, String>, FeedParseError> {
    let mut attrs = HashMap::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = decode_name(reader, attr.key.as_ref());

        // Namespace declarations are noise here
        if key.starts_with("xmlns") {
            continue;
        }

        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            std::borrow::Cow::into_owned,
        );
        attrs.insert(key, value);
    }
    Ok(attrs)
}

/// Decode XML entity references to their character values.
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        // Numeric character references
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        // Unknown entity - preserve as-is
        _ => format!("&{entity};"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const FEED_PAGE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom"
      xmlns:app="http://www.w3.org/2007/app"
      xmlns:hatena="http://www.hatena.ne.jp/info/xmlns#">
  <title>example blog</title>
  <link rel="first" href="https://blog.hatena.ne.jp/someone/blog/atom/entry"/>
  <link rel="next" href="https://blog.hatena.ne.jp/someone/blog/atom/entry?page=1685162106"/>
  <entry>
    <id>tag:blog.hatena.ne.jp,2013:blog-someone-100-200</id>
    <link rel="edit" href="https://blog.hatena.ne.jp/someone/blog/atom/entry/200"/>
    <link rel="alternate" type="text/html" href="https://someone.hatenablog.com/entry/2024/01/02/first"/>
    <author><name>someone</name></author>
    <title>first post &amp; friends</title>
    <updated>2024-01-02T03:04:05+09:00</updated>
    <published>2024-01-01T00:00:00+09:00</published>
    <app:control><app:draft>no</app:draft></app:control>
    <category term="diary" />
    <category term="rust" />
    <content type="text/x-hatena-syntax">hello *world*</content>
    <hatena:formatted-content type="text/html">&lt;p&gt;hello &lt;b&gt;world&lt;/b&gt;&lt;/p&gt;</hatena:formatted-content>
  </entry>
  <entry>
    <id>tag:blog.hatena.ne.jp,2013:blog-someone-100-201</id>
    <link rel="edit" href="https://blog.hatena.ne.jp/someone/blog/atom/entry/201"/>
    <author><name>someone</name></author>
    <title>a draft</title>
    <updated>2024-01-03T00:00:00+09:00</updated>
    <app:control><app:draft>yes</app:draft></app:control>
    <content type="text/x-markdown">draft body</content>
  </entry>
</feed>
"#;

    #[test]
    fn test_parse_feed_entries_in_order() {
        let feed = parse_feed(FEED_PAGE).unwrap();

        assert_eq!(feed.entries.len(), 2);
        assert_eq!(
            feed.entries[0].location.id,
            "tag:blog.hatena.ne.jp,2013:blog-someone-100-200"
        );
        assert_eq!(
            feed.entries[1].location.id,
            "tag:blog.hatena.ne.jp,2013:blog-someone-100-201"
        );
    }

    #[test]
    fn test_parse_feed_next_page() {
        let feed = parse_feed(FEED_PAGE).unwrap();
        assert_eq!(
            feed.next_page.as_deref(),
            Some("https://blog.hatena.ne.jp/someone/blog/atom/entry?page=1685162106")
        );
    }

    #[test]
    fn test_parse_feed_last_page_has_no_next() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <link rel="first" href="https://blog.hatena.ne.jp/someone/blog/atom/entry"/>
</feed>"#;
        let feed = parse_feed(xml).unwrap();
        assert!(feed.entries.is_empty());
        assert!(feed.next_page.is_none());
    }

    #[test]
    fn test_parse_entry_fields() {
        let feed = parse_feed(FEED_PAGE).unwrap();
        let entry = &feed.entries[0];

        assert_eq!(entry.title, "first post & friends");
        assert_eq!(entry.authors, vec!["someone".to_owned()]);
        assert_eq!(entry.content, "hello *world*");
        assert_eq!(entry.content_type.as_deref(), Some("text/x-hatena-syntax"));
        assert_eq!(entry.categories, vec!["diary".to_owned(), "rust".to_owned()]);
        assert!(!entry.is_draft);
        assert_eq!(
            entry.location.member_uri,
            "https://blog.hatena.ne.jp/someone/blog/atom/entry/200"
        );
        assert_eq!(
            entry.location.entry_uri.as_deref(),
            Some("https://someone.hatenablog.com/entry/2024/01/02/first")
        );
        assert_eq!(
            entry.formatted_content.as_deref(),
            Some("<p>hello <b>world</b></p>")
        );
        assert_eq!(
            entry.published.unwrap().to_rfc3339(),
            "2024-01-01T00:00:00+09:00"
        );
    }

    #[test]
    fn test_parse_entry_draft_flag() {
        let feed = parse_feed(FEED_PAGE).unwrap();
        assert!(feed.entries[1].is_draft);
        assert!(feed.entries[1].location.entry_uri.is_none());
    }

    #[test]
    fn test_parse_single_entry_document() {
        let xml = r#"<entry xmlns="http://www.w3.org/2005/Atom" xmlns:app="http://www.w3.org/2007/app">
  <id>tag:blog.hatena.ne.jp,2013:blog-someone-100-300</id>
  <link rel="edit" href="https://blog.hatena.ne.jp/someone/blog/atom/entry/300"/>
  <title>standalone</title>
  <updated>2024-02-01T12:00:00+09:00</updated>
  <content type="text/x-markdown">body</content>
  <app:control><app:draft>no</app:draft></app:control>
</entry>"#;
        let entry = parse_entry(xml).unwrap();
        assert_eq!(entry.title, "standalone");
        assert_eq!(entry.content, "body");
        assert!(!entry.is_draft);
    }

    #[test]
    fn test_parse_entry_missing_id_is_an_error() {
        let xml = r#"<entry xmlns="http://www.w3.org/2005/Atom">
  <link rel="edit" href="https://blog.hatena.ne.jp/someone/blog/atom/entry/300"/>
  <title>broken</title>
</entry>"#;
        let err = parse_entry(xml).unwrap_err();
        assert!(matches!(err, FeedParseError::MissingElement("<id>")));
    }

    #[test]
    fn test_parse_entry_invalid_timestamp_is_an_error() {
        let xml = r#"<entry xmlns="http://www.w3.org/2005/Atom">
  <id>tag:example,2024:1</id>
  <link rel="edit" href="https://blog.hatena.ne.jp/someone/blog/atom/entry/300"/>
  <updated>yesterday</updated>
</entry>"#;
        let err = parse_entry(xml).unwrap_err();
        assert!(matches!(
            err,
            FeedParseError::InvalidTimestamp {
                element: "updated",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_not_a_feed() {
        let err = parse_feed("<html></html>").unwrap_err();
        assert!(matches!(err, FeedParseError::MissingElement(_)));
    }

    #[test]
    fn test_update_document_round_trips_editable_fields() {
        let entry = PostedEntry {
            location: EntryLocation {
                id: "tag:example,2024:1".to_owned(),
                member_uri: "https://blog.hatena.ne.jp/someone/blog/atom/entry/1".to_owned(),
                entry_uri: None,
            },
            title: "a < b".to_owned(),
            authors: vec!["someone".to_owned()],
            content: "1 & 2".to_owned(),
            content_type: Some("text/x-markdown".to_owned()),
            categories: vec!["tag one".to_owned()],
            is_draft: true,
            published: None,
            updated: DateTime::parse_from_rfc3339("2024-01-02T03:04:05+09:00")
                .ok(),
            formatted_content: Some("<p>1 &amp; 2</p>".to_owned()),
        };

        let document = update_document(&entry);

        assert!(document.contains("<title>a &lt; b</title>"));
        assert!(document.contains("<author><name>someone</name></author>"));
        assert!(document.contains(r#"<content type="text/x-markdown">1 &amp; 2</content>"#));
        assert!(document.contains("<updated>2024-01-02T03:04:05+09:00</updated>"));
        assert!(document.contains(r#"<category term="tag one" />"#));
        assert!(document.contains("<app:control><app:draft>yes</app:draft></app:control>"));
        // Derived and identity fields stay out of the write body
        assert!(!document.contains("formatted-content"));
        assert!(!document.contains("tag:example,2024:1"));
    }

    #[test]
    fn test_create_document_marks_published_entries() {
        let entry = Entry {
            title: "new".to_owned(),
            content: "body".to_owned(),
            ..Entry::default()
        };
        let document = create_document(&entry);
        assert!(document.contains("<app:control><app:draft>no</app:draft></app:control>"));
        assert!(document.contains("<content>body</content>"));
    }
}
