//! `hdiff lists` command implementation.

use std::path::PathBuf;

use clap::Args;
use hdiff_engine::ListDiffPostProcessor;

use super::{read_input, write_result};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the lists command.
#[derive(Args)]
pub(crate) struct ListsArgs {
    /// Diff HTML containing `<del>` markup.
    input: PathBuf,

    /// Write the result to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ListsArgs {
    /// Execute the lists command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read or the output written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let html = read_input(&self.input)?;
        let processed = ListDiffPostProcessor::new().process(&html);

        write_result(&output, self.output.as_deref(), &processed)
    }
}
