//! CLI command implementations.

mod dump_entries;
mod login;
mod post_entry;
mod replace_text;

use std::path::PathBuf;

use clap::Args;

use hbt_atompub::{Credential, HatenaBlogClient};
use hbt_config::{CliSettings, Config};

use crate::error::CliError;

pub(crate) use dump_entries::DumpEntriesArgs;
pub(crate) use login::LoginArgs;
pub(crate) use post_entry::PostEntryArgs;
pub(crate) use replace_text::ReplaceTextArgs;

/// Credential and configuration options shared by every command.
#[derive(Args)]
pub(crate) struct BlogArgs {
    /// Hatena account id.
    #[arg(long, env = "HBT_HATENA_ID")]
    hatena_id: Option<String>,

    /// Blog domain name (xxx.hatenablog.com, xxx.hateblo.jp, ...).
    #[arg(long, env = "HBT_BLOG_ID")]
    blog_id: Option<String>,

    /// AtomPub API key (see the blog's advanced settings page).
    #[arg(long, env = "HBT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Path to configuration file (default: auto-discover hbt.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl BlogArgs {
    /// Load configuration with these flags applied on top.
    pub(crate) fn load_config(&self, extra: CliSettings) -> Result<Config, CliError> {
        let settings = CliSettings {
            hatena_id: self.hatena_id.clone(),
            blog_id: self.blog_id.clone(),
            api_key: self.api_key.clone(),
            ..extra
        };
        Ok(Config::load(self.config.as_deref(), Some(&settings))?)
    }

    /// Build a client from the resolved credential.
    pub(crate) fn client(&self, config: &Config) -> Result<HatenaBlogClient, CliError> {
        let blog = config.require_blog()?;
        let credential = Credential::new(&blog.hatena_id, &blog.blog_id, &blog.api_key);
        Ok(HatenaBlogClient::new(credential))
    }
}
