//! Response sinks.
//!
//! The dispatcher writes through [`ResponseSink`] so that the same code path
//! answers HTTP requests ([`HttpSink`]) and `docview dump` ([`DumpSink`]).

use std::io::{self, Write};
use std::path::PathBuf;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use docview_storage::Storage;
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// Where the dispatcher writes its outcome.
pub trait ResponseSink {
    /// Set a response header, replacing any previous value.
    fn set_header(&mut self, name: HeaderName, value: &str);

    /// Finish with `status` and `body`.
    fn write(&mut self, status: StatusCode, body: Vec<u8>);

    /// Finish with an error status and a short message.
    fn error(&mut self, status: StatusCode, message: &str);

    /// Finish by streaming the file at the virtual `path` unchanged.
    fn serve_file(&mut self, storage: &dyn Storage, path: &str);
}

fn error_text(status: StatusCode, message: &str) -> String {
    format!("{} {message}\n", status.as_u16())
}

#[derive(Debug, Default)]
enum Outcome {
    #[default]
    Empty,
    Body(StatusCode, Vec<u8>),
    Error(StatusCode, String),
    File(PathBuf),
}

/// Collects a response for axum.
///
/// Local files are handed to `tower-http`'s `ServeFile`, which answers range
/// and conditional requests itself; this needs the original request, so the
/// response is only assembled by [`HttpSink::into_response`].
#[derive(Debug, Default)]
pub struct HttpSink {
    headers: HeaderMap,
    outcome: Outcome,
}

impl HttpSink {
    /// Build the response.
    pub async fn into_response(self, request: Request) -> Response {
        let mut response = match self.outcome {
            Outcome::Empty => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            Outcome::Body(status, body) => {
                let mut response = Response::new(Body::from(body));
                *response.status_mut() = status;
                response
            }
            Outcome::Error(status, message) => (status, error_text(status, &message)).into_response(),
            Outcome::File(path) => match ServeFile::new(path).oneshot(request).await {
                Ok(response) => response.map(Body::new),
                Err(never) => match never {},
            },
        };

        for (name, value) in &self.headers {
            response.headers_mut().insert(name.clone(), value.clone());
        }
        response
    }
}

impl ResponseSink for HttpSink {
    fn set_header(&mut self, name: HeaderName, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
            }
            Err(err) => tracing::warn!(header = %name, error = %err, "Dropping invalid header value"),
        }
    }

    fn write(&mut self, status: StatusCode, body: Vec<u8>) {
        self.outcome = Outcome::Body(status, body);
    }

    fn error(&mut self, status: StatusCode, message: &str) {
        // headers set before the failure describe a page that was never sent
        self.headers.clear();
        self.outcome = Outcome::Error(status, message.to_owned());
    }

    fn serve_file(&mut self, storage: &dyn Storage, path: &str) {
        if let Some(local) = storage.local_path(path) {
            self.outcome = Outcome::File(local);
            return;
        }
        match storage.read(path) {
            Ok(bytes) => self.write(StatusCode::OK, bytes),
            Err(err) => {
                tracing::warn!(path, error = %err, "Cannot read passthrough file");
                self.error(StatusCode::NOT_FOUND, "not found");
            }
        }
    }
}

/// Writes bodies to one stream and errors to another.
///
/// Headers are dropped. The first I/O failure is kept and reported by
/// [`DumpSink::finish`].
#[derive(Debug)]
pub struct DumpSink<O, E> {
    out: O,
    err: E,
    status: StatusCode,
    failure: Option<io::Error>,
}

impl<O: Write, E: Write> DumpSink<O, E> {
    /// Dump to `out`, reporting errors on `err`.
    pub fn new(out: O, err: E) -> Self {
        Self {
            out,
            err,
            status: StatusCode::OK,
            failure: None,
        }
    }

    /// Flush both streams and return the final status.
    ///
    /// # Errors
    ///
    /// Returns the first write error.
    pub fn finish(mut self) -> io::Result<StatusCode> {
        if let Some(err) = self.failure.take() {
            return Err(err);
        }
        self.out.flush()?;
        self.err.flush()?;
        Ok(self.status)
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(err) = result
            && self.failure.is_none()
        {
            self.failure = Some(err);
        }
    }
}

impl<O: Write, E: Write> ResponseSink for DumpSink<O, E> {
    fn set_header(&mut self, name: HeaderName, value: &str) {
        tracing::debug!(header = %name, value, "Dump header");
    }

    fn write(&mut self, status: StatusCode, body: Vec<u8>) {
        self.status = status;
        let result = self.out.write_all(&body);
        self.record(result);
    }

    fn error(&mut self, status: StatusCode, message: &str) {
        self.status = status;
        let result = self.err.write_all(error_text(status, message).as_bytes());
        self.record(result);
    }

    fn serve_file(&mut self, storage: &dyn Storage, path: &str) {
        match storage.open(path) {
            Ok(mut reader) => {
                self.status = StatusCode::OK;
                let result = io::copy(&mut reader, &mut self.out).map(|_| ());
                self.record(result);
            }
            Err(err) => {
                tracing::warn!(path, error = %err, "Cannot open passthrough file");
                self.error(StatusCode::NOT_FOUND, "not found");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::header;
    use docview_storage::MockStorage;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_dump_sink_splits_streams() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut sink = DumpSink::new(&mut out, &mut err);

        sink.set_header(header::ETAG, "\"x\"");
        sink.write(StatusCode::OK, b"<p>page</p>".to_vec());
        assert_eq!(sink.finish().unwrap(), StatusCode::OK);

        assert_eq!(out, b"<p>page</p>");
        assert!(err.is_empty());
    }

    #[test]
    fn test_dump_sink_error() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut sink = DumpSink::new(&mut out, &mut err);

        sink.error(StatusCode::NOT_FOUND, "not found");
        assert_eq!(sink.finish().unwrap(), StatusCode::NOT_FOUND);

        assert!(out.is_empty());
        assert_eq!(String::from_utf8(err).unwrap(), "404 not found\n");
    }

    #[test]
    fn test_dump_sink_serves_file_from_storage() {
        let storage = MockStorage::new().with_file("/docs/logo.png", vec![0x89, b'P', b'N', b'G']);
        let mut out = Vec::new();
        let mut sink = DumpSink::new(&mut out, io::sink());

        sink.serve_file(&storage, "/docs/logo.png");
        sink.finish().unwrap();

        assert_eq!(out, vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_http_sink_reads_file_without_local_path() {
        let storage = MockStorage::new().with_file("/a.bin", "raw");
        let mut sink = HttpSink::default();
        sink.set_header(header::CONTENT_TYPE, "application/x-test");
        sink.serve_file(&storage, "/a.bin");

        let response = sink.into_response(Request::new(Body::empty())).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/x-test");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"raw");
    }

    #[tokio::test]
    async fn test_http_sink_serves_local_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("data.csv"), "a,b\n").unwrap();
        let storage = docview_storage::FsStorage::new(dir.path());
        let mut sink = HttpSink::default();
        sink.serve_file(&storage, "/data.csv");

        let response = sink.into_response(Request::new(Body::empty())).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"a,b\n");
    }

    #[tokio::test]
    async fn test_http_sink_error_drops_headers() {
        let mut sink = HttpSink::default();
        sink.set_header(header::ETAG, "\"x\"");
        sink.error(StatusCode::SERVICE_UNAVAILABLE, "template execute error");

        let response = sink.into_response(Request::new(Body::empty())).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.headers().get(header::ETAG).is_none());
    }
}
