//! `docview serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use docview_config::{CliSettings, Config};
use docview_server::run_server;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover docview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Document root directory (overrides config).
    #[arg(short, long)]
    document_root: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long, env = "DOCVIEW_HOST")]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long, env = "DOCVIEW_PORT")]
    port: Option<u16>,

    /// Enable verbose output (request and startup logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            document_root: self.document_root,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.highlight(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Document root: {}",
            config.view_resolved.document_root.display()
        ));
        if let Some(path) = &config.config_path {
            output.info(&format!("Configuration: {}", path.display()));
        }

        run_server(&config).await?;

        Ok(())
    }
}
