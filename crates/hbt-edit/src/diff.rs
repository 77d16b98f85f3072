//! Diff generators for before/after entry content.

use std::io::{self, Write};
use std::process::Command;

use similar::TextDiff;
use tempfile::NamedTempFile;
use tracing::debug;

/// Renders a human-readable diff of one entry's content change.
///
/// `is_available` is a run precondition: the batch pipeline checks it once
/// and refuses to start when it fails, so a broken diff setup surfaces
/// before any entry is touched rather than on the first change.
pub trait DiffGenerator {
    /// Whether this generator can run.
    fn is_available(&self) -> bool;

    /// Write the rendered diff of `before` → `after` to `out`.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the sink or, for external tools, from
    /// running the command.
    fn generate(&self, before: &str, after: &str, out: &mut dyn Write) -> io::Result<()>;
}

/// Silent generator for runs with diff display disabled.
pub struct NullDiff;

impl DiffGenerator for NullDiff {
    fn is_available(&self) -> bool {
        true
    }

    fn generate(&self, _before: &str, _after: &str, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}

/// In-process line-based unified diff.
pub struct UnifiedDiff {
    label_before: String,
    label_after: String,
}

impl UnifiedDiff {
    /// Diff renderer with the given header labels.
    #[must_use]
    pub fn new(label_before: &str, label_after: &str) -> Self {
        Self {
            label_before: label_before.to_owned(),
            label_after: label_after.to_owned(),
        }
    }
}

impl DiffGenerator for UnifiedDiff {
    fn is_available(&self) -> bool {
        true
    }

    fn generate(&self, before: &str, after: &str, out: &mut dyn Write) -> io::Result<()> {
        let diff = TextDiff::from_lines(before, after);
        write!(
            out,
            "{}",
            diff.unified_diff()
                .context_radius(3)
                .header(&self.label_before, &self.label_after)
        )
    }
}

/// External diff command over temporary input files.
///
/// Both texts are written to temp files and the configured command is
/// invoked with its configured arguments plus the two paths; its stdout is
/// streamed to the sink. A nonzero exit status is normal for diff tools
/// and is not an error; only a failure to launch is.
pub struct CommandDiff {
    command: String,
    args: Vec<String>,
}

impl CommandDiff {
    /// Use `command` with `args` as the diff tool.
    #[must_use]
    pub fn new(command: &str, args: &[String]) -> Self {
        Self {
            command: command.to_owned(),
            args: args.to_vec(),
        }
    }

    fn run(&self, before: &str, after: &str, out: &mut dyn Write) -> io::Result<()> {
        let mut before_file = NamedTempFile::new()?;
        let mut after_file = NamedTempFile::new()?;
        before_file.write_all(before.as_bytes())?;
        after_file.write_all(after.as_bytes())?;
        before_file.flush()?;
        after_file.flush()?;

        debug!("running diff command {}", self.command);
        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(before_file.path())
            .arg(after_file.path())
            .output()?;

        out.write_all(&output.stdout)
    }
}

impl DiffGenerator for CommandDiff {
    fn is_available(&self) -> bool {
        // Probe by launching against two throwaway inputs; a tool that
        // cannot be spawned is unavailable, whatever its exit status says.
        self.run("", "", &mut io::sink()).is_ok()
    }

    fn generate(&self, before: &str, after: &str, out: &mut dyn Write) -> io::Result<()> {
        self.run(before, after, out)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn render(generator: &dyn DiffGenerator, before: &str, after: &str) -> String {
        let mut out = Vec::new();
        generator.generate(before, after, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_null_diff_is_silent_and_available() {
        let diff = NullDiff;
        assert!(diff.is_available());
        assert_eq!(render(&diff, "a\n", "b\n"), "");
    }

    #[test]
    fn test_unified_diff_marks_changed_lines() {
        let diff = UnifiedDiff::new("before", "after");
        let rendered = render(&diff, "one\ntwo\nthree\n", "one\n2\nthree\n");

        assert!(rendered.contains("--- before"));
        assert!(rendered.contains("+++ after"));
        assert!(rendered.contains("-two"));
        assert!(rendered.contains("+2"));
        assert!(rendered.contains(" one"));
    }

    #[test]
    fn test_unified_diff_of_identical_text_is_empty() {
        let diff = UnifiedDiff::new("before", "after");
        assert_eq!(render(&diff, "same\n", "same\n"), "");
    }

    #[test]
    fn test_command_diff_unavailable_for_missing_binary() {
        let diff = CommandDiff::new("hbt-no-such-diff-command", &[]);
        assert!(!diff.is_available());
    }

    #[test]
    fn test_command_diff_available_for_existing_binary() {
        // `true` ignores its arguments and exits 0 on any unix
        let diff = CommandDiff::new("true", &[]);
        assert!(diff.is_available());
    }

    #[test]
    fn test_command_diff_streams_stdout() {
        // `cat` concatenates the two temp files verbatim
        let diff = CommandDiff::new("cat", &[]);
        assert_eq!(render(&diff, "left\n", "right\n"), "left\nright\n");
    }
}
