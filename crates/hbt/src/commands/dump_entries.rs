//! `hbt dump-entries` command implementation.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Args, ValueEnum};

use hbt_atompub::PostedEntry;
use hbt_config::CliSettings;
use hbt_export::{BloggerFormatter, EntryFormatter, MovableTypeFormatter};

use crate::error::CliError;
use crate::output::Output;

use super::BlogArgs;

/// Export format selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// MovableType import format.
    MovableType,
    /// Blogger Atom export document.
    Blogger,
}

/// Arguments for the dump-entries command.
#[derive(Args)]
pub(crate) struct DumpEntriesArgs {
    #[command(flatten)]
    blog: BlogArgs,

    /// Export format.
    #[arg(long, value_enum, default_value_t = ExportFormat::MovableType)]
    format: ExportFormat,

    /// Output file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Feed title for the blogger export.
    #[arg(long)]
    blog_title: Option<String>,
}

impl DumpEntriesArgs {
    /// Execute the dump-entries command.
    ///
    /// # Errors
    ///
    /// Returns an error when login or the traversal fails; a fetch
    /// failure anywhere aborts the export rather than writing a partial
    /// document.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.blog.load_config(CliSettings::default())?;
        let client = self.blog.client(&config)?;

        output.info(&format!(
            "logging in to {} ...",
            client.credential().service_root()
        ));
        client.login()?;
        output.success("login OK");

        output.info("fetching entries ...");
        let entries: Vec<PostedEntry> = client.entries().collect::<Result<_, _>>()?;
        output.info(&format!("fetched {} entries", entries.len()));

        let formatter: Box<dyn EntryFormatter> = match self.format {
            ExportFormat::MovableType => Box::new(MovableTypeFormatter::new()),
            ExportFormat::Blogger => Box::new(match &self.blog_title {
                Some(title) => BloggerFormatter::with_blog_title(title),
                None => BloggerFormatter::new(),
            }),
        };

        match &self.output {
            Some(path) => {
                let mut writer = BufWriter::new(File::create(path)?);
                formatter.format(&entries, &mut writer)?;
                writer.flush()?;
                output.success(&format!("wrote {}", path.display()));
            }
            None => {
                let mut stdout = io::stdout().lock();
                formatter.format(&entries, &mut stdout)?;
                stdout.flush()?;
            }
        }

        Ok(())
    }
}
