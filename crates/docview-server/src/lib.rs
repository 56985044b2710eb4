//! HTTP server for docview.
//!
//! Every GET request is answered by [`View::write_view`]: markdown, plain
//! text and HTML documents are rendered through the page template, directory
//! requests show their index document or a listing, and other files are
//! passed through unchanged.
//!
//! ```text
//! Browser ──HTTP──► axum (catch-all handler)
//!                        │
//!                        └─► spawn_blocking ──► View::write_view ──► HttpSink
//!                                                   │
//!                                                   ├─► RequestTarget (resolve)
//!                                                   ├─► Converter (markdown)
//!                                                   └─► Templates (minijinja)
//! ```
//!
//! The same dispatcher renders a single page to a stream through
//! [`View::dump`].

mod app;
mod authz;
mod error;
mod handler;
mod icons;
mod middleware;
mod sink;
mod state;
mod templates;
mod view;

use std::sync::Arc;

use docview_config::Config;
use docview_storage::{FsStorage, Storage};

pub use authz::{UserDirectory, UserMap};
pub use error::{ServerError, ViewError};
pub use sink::{DumpSink, HttpSink, ResponseSink};
pub use view::View;

use state::AppState;

/// Build the view for `config` over the host filesystem.
///
/// # Errors
///
/// Returns [`ViewError`] if templates or render settings are unusable.
pub fn view_from_config(config: &Config) -> Result<View, ViewError> {
    let storage: Arc<dyn Storage> = Arc::new(FsStorage::new("/"));
    View::new(storage, config)
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the view cannot be built or the listener cannot bind.
pub async fn run_server(config: &Config) -> Result<(), ServerError> {
    let view = view_from_config(config)?;
    let state = Arc::new(AppState {
        view: Arc::new(view),
    });
    let app = app::create_router(state);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    tracing::info!(address = %listener.local_addr()?, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Cannot listen for Ctrl-C");
        return;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
