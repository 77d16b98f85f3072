//! `hbt replace-text` command implementation.

use std::io::{self, Write};

use clap::Args;

use hbt_config::{CliSettings, DiffConfig};
use hbt_edit::{
    BatchEdit, CommandDiff, DiffGenerator, EntryEditor, NullDiff, PostMode, RegexReplaceEditor,
    ReplaceEditor, RunError, RunSummary, UnifiedDiff,
};

use crate::error::CliError;
use crate::output::Output;

use super::BlogArgs;

const DIFF_LABEL_BEFORE: &str = "content before replacement";
const DIFF_LABEL_AFTER: &str = "content after replacement";

/// Arguments for the replace-text command.
#[derive(Args)]
pub(crate) struct ReplaceTextArgs {
    #[command(flatten)]
    blog: BlogArgs,

    /// Text to be replaced.
    #[arg(long)]
    from: String,

    /// Replacement text (omit to delete matches).
    #[arg(long)]
    to: Option<String>,

    /// Treat --from as a regular expression and --to as a $n template.
    #[arg(long)]
    regex: bool,

    /// External diff command (default: built-in unified diff).
    #[arg(long)]
    diff_cmd: Option<String>,

    /// Arguments for the external diff command.
    #[arg(long, allow_hyphen_values = true)]
    diff_cmd_args: Option<String>,

    /// Display each change as a diff.
    #[arg(short, long)]
    verbose: bool,

    /// Dry run: edit and diff every entry, write nothing back.
    #[arg(short = 'n', long)]
    dry_run: bool,
}

impl ReplaceTextArgs {
    /// Execute the replace-text command.
    ///
    /// # Errors
    ///
    /// Returns an error when login fails, the diff tool is unavailable,
    /// the traversal aborts, or any entry's update was rejected.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.blog.load_config(CliSettings {
            diff_command: self.diff_cmd.clone(),
            diff_args: self
                .diff_cmd_args
                .as_deref()
                .map(|args| args.split_whitespace().map(str::to_owned).collect()),
            ..CliSettings::default()
        })?;
        let client = self.blog.client(&config)?;

        let to = self.to.as_deref().unwrap_or("");
        let editor: Box<dyn EntryEditor> = if self.regex {
            Box::new(
                RegexReplaceEditor::new(&self.from, to)
                    .map_err(|err| CliError::Validation(format!("invalid pattern: {err}")))?,
            )
        } else {
            Box::new(ReplaceEditor::new(&self.from, to))
        };

        let diff = select_diff(self.verbose, &config.diff);
        let post_mode = if self.dry_run {
            PostMode::Never
        } else {
            PostMode::IfModified
        };

        output.info(&format!(
            "logging in to {} ...",
            client.credential().service_root()
        ));
        client.login()?;
        output.success("login OK");

        if self.dry_run {
            output.highlight("[DRY RUN] nothing will be written back");
        }

        let mut diff_sink = io::stdout().lock();
        let run =
            BatchEdit::new(&client, post_mode).run(editor.as_ref(), diff.as_ref(), &mut diff_sink);
        let _ = diff_sink.flush();

        let summary = match run {
            Ok(summary) => summary,
            Err(RunError::DiffToolUnavailable) => {
                return Err(CliError::Validation(
                    "the configured diff command is not available; check its path \
                     and that temporary files can be created"
                        .to_owned(),
                ));
            }
            Err(RunError::Aborted { fault, summary }) => {
                print_summary(&output, &summary);
                output.error("traversal aborted before visiting every entry");
                return Err(CliError::AtomPub(fault));
            }
            Err(RunError::DiffOutput { fault, summary }) => {
                print_summary(&output, &summary);
                return Err(CliError::Io(fault));
            }
        };

        print_summary(&output, &summary);
        if !summary.failed.is_empty() {
            return Err(CliError::EntriesFailed(summary.failed.len()));
        }
        Ok(())
    }
}

/// Pick the diff generator for this run.
///
/// Diff display is opt-in: without `--verbose` every change is applied
/// silently. With it, the configured external command wins over the
/// built-in unified diff.
fn select_diff(verbose: bool, config: &DiffConfig) -> Box<dyn DiffGenerator> {
    if !verbose {
        return Box::new(NullDiff);
    }
    match &config.command {
        Some(command) => Box::new(CommandDiff::new(command, &config.args)),
        None => Box::new(UnifiedDiff::new(DIFF_LABEL_BEFORE, DIFF_LABEL_AFTER)),
    }
}

fn print_summary(output: &Output, summary: &RunSummary) {
    output.info("");
    output.info(&format!(
        "visited: {}, changed: {}, committed: {}, skipped: {}, failed: {}",
        summary.visited,
        summary.changed,
        summary.committed,
        summary.skipped,
        summary.failed.len()
    ));

    if summary.cancelled {
        output.warning("run was cancelled; remaining entries were not visited");
    }

    if summary.failed.is_empty() {
        output.success("no failed entries");
    } else {
        output.warning("failed entries (re-run to retry these):");
        for failure in &summary.failed {
            output.info(&format!("  - {}: {}", failure.id, failure.error));
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_silent_runs_use_the_null_diff() {
        let diff = select_diff(false, &DiffConfig::default());
        // Null generator renders nothing
        let mut out = Vec::new();
        diff.generate("a\n", "b\n", &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_verbose_runs_default_to_the_unified_diff() {
        let diff = select_diff(true, &DiffConfig::default());
        let mut out = Vec::new();
        diff.generate("a\n", "b\n", &mut out).unwrap();
        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.contains(DIFF_LABEL_BEFORE));
        assert!(rendered.contains("+b"));
    }

    #[test]
    fn test_verbose_runs_prefer_the_configured_command() {
        let config = DiffConfig {
            command: Some("cat".to_owned()),
            args: Vec::new(),
        };
        let diff = select_diff(true, &config);
        let mut out = Vec::new();
        diff.generate("a\n", "b\n", &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\nb\n");
    }
}
