//! The catch-all request handler.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;

use crate::sink::HttpSink;
use crate::state::AppState;

/// Answer any request path through the dispatcher.
///
/// Only GET is supported. The dispatcher does blocking storage I/O and runs on
/// the blocking pool.
pub(crate) async fn view(State(state): State<Arc<AppState>>, request: Request) -> Response {
    if request.method() != Method::GET {
        let message = format!("405 not supported {} method\n", request.method());
        return (StatusCode::METHOD_NOT_ALLOWED, message).into_response();
    }

    let path = match percent_decode_str(request.uri().path()).decode_utf8() {
        Ok(path) => path.into_owned(),
        Err(_) => return (StatusCode::BAD_REQUEST, "400 bad request path\n").into_response(),
    };

    let view = Arc::clone(&state.view);
    let headers = request.headers().clone();
    let worker = tokio::task::spawn_blocking(move || {
        let mut sink = HttpSink::default();
        view.write_view(&path, &headers, &mut sink);
        sink
    });

    match worker.await {
        Ok(sink) => sink.into_response(request).await,
        Err(err) => {
            tracing::error!(error = %err, "View worker failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
