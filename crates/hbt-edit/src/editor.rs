//! Pluggable entry content editors.

use hbt_atompub::PostedEntry;
use regex::{Captures, Regex, RegexBuilder};

/// Rewrites an entry's raw content in place.
///
/// `edit` returns whether the entry changed; when it did, the (before,
/// after) pair is also reported through `on_change` so callers can diff
/// it. Editors touch nothing but `content`; title, tags, and timestamps
/// stay as they were.
pub trait EntryEditor {
    /// Apply the edit to `entry`.
    fn edit(&self, entry: &mut PostedEntry, on_change: &mut dyn FnMut(&str, &str)) -> bool;
}

/// Literal substring replacement.
///
/// Replaces every non-overlapping occurrence of `from` with `to`.
/// The entry counts as changed iff the resulting content differs from the
/// original, byte for byte.
pub struct ReplaceEditor {
    from: String,
    to: String,
}

impl ReplaceEditor {
    /// Replace occurrences of `from` with `to`.
    #[must_use]
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_owned(),
            to: to.to_owned(),
        }
    }
}

impl EntryEditor for ReplaceEditor {
    fn edit(&self, entry: &mut PostedEntry, on_change: &mut dyn FnMut(&str, &str)) -> bool {
        let original = entry.content.clone();
        entry.content = original.replace(&self.from, &self.to);

        let changed = original != entry.content;
        if changed {
            on_change(&original, &entry.content);
        }
        changed
    }
}

/// Regular-expression replacement with `$n` backreference templates.
///
/// The pattern is compiled in multiline mode: `^`/`$` match at line
/// boundaries, `.` does not cross newlines. The entry counts as changed
/// iff the pattern matched at all, even when the substituted text equals
/// what it replaced.
pub struct RegexReplaceEditor {
    pattern: Regex,
    replacement: String,
}

impl RegexReplaceEditor {
    /// Replace matches of `pattern` with the `replacement` template.
    ///
    /// # Errors
    ///
    /// Returns the compile error for an invalid pattern.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: RegexBuilder::new(pattern).multi_line(true).build()?,
            replacement: replacement.to_owned(),
        })
    }
}

impl EntryEditor for RegexReplaceEditor {
    fn edit(&self, entry: &mut PostedEntry, on_change: &mut dyn FnMut(&str, &str)) -> bool {
        let original = entry.content.clone();
        let mut matched = false;

        entry.content = self
            .pattern
            .replace_all(&original, |caps: &Captures<'_>| {
                matched = true;
                let mut expanded = String::new();
                caps.expand(&self.replacement, &mut expanded);
                expanded
            })
            .into_owned();

        if matched {
            on_change(&original, &entry.content);
        }
        matched
    }
}
