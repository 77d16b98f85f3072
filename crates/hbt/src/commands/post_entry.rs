//! `hbt post-entry` command implementation.

use std::io::Read;
use std::path::PathBuf;

use clap::Args;

use hbt_atompub::Entry;
use hbt_config::CliSettings;

use crate::error::CliError;
use crate::output::Output;

use super::BlogArgs;

/// Arguments for the post-entry command.
#[derive(Args)]
pub(crate) struct PostEntryArgs {
    #[command(flatten)]
    blog: BlogArgs,

    /// Entry title.
    #[arg(long)]
    title: String,

    /// File holding the entry body (default: read stdin).
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Category tag; repeat for multiple tags.
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Save as a draft instead of publishing.
    #[arg(long)]
    draft: bool,
}

impl PostEntryArgs {
    /// Execute the post-entry command.
    ///
    /// # Errors
    ///
    /// Returns an error when the body cannot be read, login fails, or the
    /// server rejects the new entry.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.blog.load_config(CliSettings::default())?;
        let client = self.blog.client(&config)?;

        let content = match &self.file {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer)?;
                buffer
            }
        };

        let entry = Entry {
            title: self.title.clone(),
            content,
            categories: self.categories.clone(),
            is_draft: self.draft,
            ..Entry::default()
        };

        output.info(&format!(
            "logging in to {} ...",
            client.credential().service_root()
        ));
        client.login()?;
        output.success("login OK");

        let posted = client.create_entry(&entry)?;

        output.success(&format!("posted \"{}\"", posted.title));
        output.info(&format!("  id:     {}", posted.location.id));
        output.info(&format!("  member: {}", posted.location.member_uri));
        if let Some(entry_uri) = &posted.location.entry_uri {
            output.info(&format!("  page:   {entry_uri}"));
        }

        Ok(())
    }
}
