//! `docview dump` command implementation.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use docview_config::{CliSettings, Config};
use docview_server::view_from_config;

use crate::error::CliError;

/// Arguments for the dump command.
#[derive(Args)]
pub(crate) struct DumpArgs {
    /// Path to configuration file (default: auto-discover docview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Document root directory (overrides config).
    #[arg(short, long)]
    document_root: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Request path relative to the document root (e.g. `guide/intro.md`).
    path: String,
}

impl DumpArgs {
    /// Execute the dump command.
    ///
    /// The rendered page goes to stdout; error bodies go to stderr.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the page is not a 200.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let stdout = io::stdout();
        let stderr = io::stderr();
        self.run(stdout.lock(), stderr.lock())
    }

    fn run<O: Write, E: Write>(self, out: O, err: E) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            document_root: self.document_root,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let view = view_from_config(&config)?;

        let status = view.dump(&self.path, out, err)?;
        tracing::info!(path = %self.path, status, "Dumped page");
        if status != 200 {
            return Err(CliError::Status {
                path: self.path,
                status,
            });
        }
        Ok(())
    }
}
