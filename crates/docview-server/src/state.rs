//! Application state.

use std::sync::Arc;

use crate::view::View;

/// State shared by all request handlers.
pub(crate) struct AppState {
    /// Dispatcher, moved into blocking workers per request.
    pub(crate) view: Arc<View>,
}
