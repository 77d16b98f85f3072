//! `hbt login` command implementation.

use clap::Args;

use hbt_config::CliSettings;

use crate::error::CliError;
use crate::output::Output;

use super::BlogArgs;

/// Arguments for the login command.
#[derive(Args)]
pub(crate) struct LoginArgs {
    #[command(flatten)]
    blog: BlogArgs,
}

impl LoginArgs {
    /// Execute the login command.
    ///
    /// # Errors
    ///
    /// Returns an error when the credential is rejected or unreachable.
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

        Ok(())
    }
}
