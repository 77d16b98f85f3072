//! MovableType import format.
//!
//! Reference: <https://www.movabletype.jp/documentation/appendices/import-export-format.html>

use std::io::{self, Write};

use chrono::{DateTime, FixedOffset};

use hbt_atompub::PostedEntry;

use crate::EntryFormatter;

const FIELD_DELIMITER: &str = "-----";
const ENTRY_DELIMITER: &str = "--------";

/// Renders entries as a MovableType import stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovableTypeFormatter;

impl MovableTypeFormatter {
    /// Create a formatter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// `MM/dd/yyyy hh:mm:ss AM|PM` of the timestamp's own wall clock; the
/// offset is not converted away.
fn date_string(stamp: DateTime<FixedOffset>) -> String {
    stamp.naive_local().format("%m/%d/%Y %I:%M:%S %p").to_string()
}

/// Tags containing spaces are quoted in the TAGS field.
fn tag_field(categories: &[String]) -> String {
    categories
        .iter()
        .map(|tag| {
            if tag.contains(' ') {
                format!("\"{tag}\"")
            } else {
                tag.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Path of the public entry URI relative to the `/entry/` prefix.
fn basename(entry: &PostedEntry) -> Option<&str> {
    let uri = entry.location.entry_uri.as_deref()?;
    let rest = uri.split_once("://").map_or(uri, |(_, rest)| rest);
    let path = &rest[rest.find('/')?..];
    path.strip_prefix("/entry/")
}

impl EntryFormatter for MovableTypeFormatter {
    fn format(&self, entries: &[PostedEntry], out: &mut dyn Write) -> io::Result<()> {
        for entry in entries {
            writeln!(out, "AUTHOR: {}", entry.author_line())?;
            writeln!(out, "TITLE: {}", entry.title)?;

            if let Some(basename) = basename(entry) {
                writeln!(out, "BASENAME: {basename}")?;
            }

            writeln!(
                out,
                "STATUS: {}",
                if entry.is_draft { "Draft" } else { "Publish" }
            )?;
            writeln!(out, "CONVERT BREAKS: 0")?;

            if let Some(updated) = entry.updated {
                writeln!(out, "DATE: {}", date_string(updated))?;
            }

            writeln!(out, "TAGS: {}", tag_field(&entry.categories))?;

            writeln!(out, "{FIELD_DELIMITER}")?;
            writeln!(out, "BODY:")?;
            writeln!(out, "{}", entry.formatted_content.as_deref().unwrap_or(""))?;
            writeln!(out, "{FIELD_DELIMITER}")?;

            writeln!(out, "{ENTRY_DELIMITER}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hbt_atompub::EntryLocation;
    use pretty_assertions::assert_eq;

    use super::*;

    fn stamp(value: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(value).unwrap()
    }

    fn render(entries: &[PostedEntry]) -> String {
        let mut out = Vec::new();
        MovableTypeFormatter::new().format(entries, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn minimal_entry(title: &str, formatted: &str, is_draft: bool) -> PostedEntry {
        PostedEntry {
            location: EntryLocation {
                id: "tag:blog.example.com,2020:entry0".to_owned(),
                member_uri: "https://blog.example.com/atom/entry/0/".to_owned(),
                entry_uri: None,
            },
            title: title.to_owned(),
            authors: Vec::new(),
            content: format!("{title}-content"),
            content_type: None,
            categories: Vec::new(),
            is_draft,
            published: None,
            updated: None,
            formatted_content: Some(formatted.to_owned()),
        }
    }

    #[test]
    fn test_date_string_morning_midnight_is_twelve_am() {
        assert_eq!(
            date_string(stamp("2020-03-31T00:01:02+09:00")),
            "03/31/2020 12:01:02 AM"
        );
    }

    #[test]
    fn test_date_string_ignores_the_offset() {
        // Wall-clock formatting: the same local time renders identically
        // whatever its offset
        assert_eq!(
            date_string(stamp("2020-03-31T00:00:00+09:00")),
            "03/31/2020 12:00:00 AM"
        );
        assert_eq!(
            date_string(stamp("2020-03-31T00:00:00-05:00")),
            "03/31/2020 12:00:00 AM"
        );
    }

    #[test]
    fn test_date_string_twelve_hour_clock() {
        assert_eq!(
            date_string(stamp("2020-03-31T11:01:02+00:00")),
            "03/31/2020 11:01:02 AM"
        );
        assert_eq!(
            date_string(stamp("2020-03-31T12:01:02+00:00")),
            "03/31/2020 12:01:02 PM"
        );
        assert_eq!(
            date_string(stamp("2020-03-31T13:01:02+00:00")),
            "03/31/2020 01:01:02 PM"
        );
        assert_eq!(
            date_string(stamp("2020-03-31T23:01:02+00:00")),
            "03/31/2020 11:01:02 PM"
        );
    }

    #[test]
    fn test_format_single_entry() {
        let entry = PostedEntry {
            location: EntryLocation {
                id: "tag:blog.example.com,2020:entry0".to_owned(),
                member_uri: "https://blog.example.com/atom/entry/0/".to_owned(),
                entry_uri: Some("https://example.com/entry/0/".to_owned()),
            },
            title: "entry0".to_owned(),
            authors: vec!["entry0-author0".to_owned(), "entry0-author1".to_owned()],
            content: "entry0-content".to_owned(),
            content_type: Some("text/x-hatena-syntax".to_owned()),
            categories: vec![
                "entry0-category0".to_owned(),
                "entry0-category1".to_owned(),
                "entry0-category2".to_owned(),
            ],
            is_draft: false,
            published: Some(stamp("2020-03-31T00:00:00+00:00")),
            updated: Some(stamp("2020-03-31T00:00:00+09:00")),
            formatted_content: Some("entry0-formatted-content".to_owned()),
        };

        let expected = [
            "AUTHOR: entry0-author0 entry0-author1",
            "TITLE: entry0",
            "BASENAME: 0/",
            "STATUS: Publish",
            "CONVERT BREAKS: 0",
            "DATE: 03/31/2020 12:00:00 AM",
            "TAGS: entry0-category0,entry0-category1,entry0-category2",
            "-----",
            "BODY:",
            "entry0-formatted-content",
            "-----",
            "--------",
            "",
        ]
        .join("\n");

        assert_eq!(render(&[entry]), expected);
    }

    #[test]
    fn test_format_multiple_entries() {
        let entries = vec![
            minimal_entry("entry0", "entry0-formatted-content", false),
            minimal_entry("entry1", "entry1-formatted-content", true),
        ];

        let expected = [
            "AUTHOR: ",
            "TITLE: entry0",
            "STATUS: Publish",
            "CONVERT BREAKS: 0",
            "TAGS: ",
            "-----",
            "BODY:",
            "entry0-formatted-content",
            "-----",
            "--------",
            "AUTHOR: ",
            "TITLE: entry1",
            "STATUS: Draft",
            "CONVERT BREAKS: 0",
            "TAGS: ",
            "-----",
            "BODY:",
            "entry1-formatted-content",
            "-----",
            "--------",
            "",
        ]
        .join("\n");

        assert_eq!(render(&entries), expected);
    }

    #[test]
    fn test_tags_with_spaces_are_quoted() {
        assert_eq!(
            tag_field(&["plain".to_owned(), "two words".to_owned()]),
            "plain,\"two words\""
        );
    }

    #[test]
    fn test_basename_requires_the_entry_prefix() {
        let mut entry = minimal_entry("entry0", "body", false);
        entry.location.entry_uri = Some("https://example.com/archive/0/".to_owned());
        assert_eq!(basename(&entry), None);

        entry.location.entry_uri = Some("https://example.com/entry/2020/03/31/x".to_owned());
        assert_eq!(basename(&entry), Some("2020/03/31/x"));
    }
}
