//! Blogger Atom export format.
//!
//! Produces the feed document Blogger's importer accepts: entries under a
//! Google "kind#post" category, blogger-namespace categories, and the
//! rendered (HTML) content.

use std::fmt::Write as _;
use std::io::{self, Write};

use chrono::SecondsFormat;

use hbt_atompub::PostedEntry;

use crate::EntryFormatter;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const APP_NS: &str = "http://www.w3.org/2007/app";
const KIND_SCHEME: &str = "http://schemas.google.com/g/2005#kind";
const KIND_POST: &str = "http://schemas.google.com/blogger/2008/kind#post";
const BLOGGER_CATEGORY_SCHEME: &str = "http://www.blogger.com/atom/ns#";

/// Renders entries as a Blogger export feed.
#[derive(Debug, Clone, Default)]
pub struct BloggerFormatter {
    blog_title: Option<String>,
}

impl BloggerFormatter {
    /// Formatter without a feed title.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Formatter emitting `title` as the feed title.
    #[must_use]
    pub fn with_blog_title(title: &str) -> Self {
        Self {
            blog_title: Some(title.to_owned()),
        }
    }
}

impl EntryFormatter for BloggerFormatter {
    fn format(&self, entries: &[PostedEntry], out: &mut dyn Write) -> io::Result<()> {
        let mut doc = String::with_capacity(1024);
        doc.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        writeln!(doc, r#"<feed xmlns="{ATOM_NS}" xmlns:app="{APP_NS}">"#).unwrap();

        if let Some(title) = &self.blog_title {
            writeln!(doc, "  <title>{}</title>", escape_text(title)).unwrap();
        }
        doc.push_str("  <generator>Blogger</generator>\n");

        for entry in entries {
            write_entry(&mut doc, entry);
        }

        doc.push_str("</feed>\n");
        out.write_all(doc.as_bytes())
    }
}

fn write_entry(doc: &mut String, entry: &PostedEntry) {
    doc.push_str("  <entry>\n");
    writeln!(doc, "    <id>{}</id>", escape_text(&entry.location.id)).unwrap();

    for author in &entry.authors {
        writeln!(
            doc,
            "    <author><name>{}</name></author>",
            escape_text(author)
        )
        .unwrap();
    }

    if let Some(published) = entry.published {
        writeln!(
            doc,
            "    <published>{}</published>",
            published.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
        .unwrap();
    }
    if let Some(updated) = entry.updated {
        writeln!(
            doc,
            "    <updated>{}</updated>",
            updated.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
        .unwrap();
    }

    writeln!(
        doc,
        r#"    <title type="text">{}</title>"#,
        escape_text(&entry.title)
    )
    .unwrap();

    if entry.is_draft {
        doc.push_str("    <app:control><app:draft>yes</app:draft></app:control>\n");
    }

    writeln!(
        doc,
        r#"    <category scheme="{KIND_SCHEME}" term="{KIND_POST}" />"#
    )
    .unwrap();
    for category in &entry.categories {
        writeln!(
            doc,
            r#"    <category scheme="{BLOGGER_CATEGORY_SCHEME}" term="{}" />"#,
            escape_attr(category)
        )
        .unwrap();
    }

    writeln!(
        doc,
        r#"    <content type="html">{}</content>"#,
        escape_text(entry.formatted_content.as_deref().unwrap_or(""))
    )
    .unwrap();

    doc.push_str("  </entry>\n");
}

/// Escape text for XML content.
fn escape_text(text: &str) -> String {
    escape_xml(text, false)
}

/// Escape text for XML attribute values.
fn escape_attr(text: &str) -> String {
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
