//! The response sink handlers write into.
//!
//! [`ResponseWriter`] is the capability every handler and middleware sees.
//! [`Response`] is the buffering implementation the server hands to each
//! request; once the pipeline returns it becomes an `http::Response`.
//!
//! The contract mirrors a classic streaming writer:
//!
//! - the first [`write_header`](ResponseWriter::write_header) commits the
//!   status and headers, later calls are ignored;
//! - [`write`](ResponseWriter::write) without a prior status commits `200 OK`;
//! - header edits after the commit have no effect on the response.

use bytes::{Bytes, BytesMut};
use http::header::{CONTENT_TYPE, HeaderValue, X_CONTENT_TYPE_OPTIONS};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;
use tracing::debug;

// ── ResponseWriter ────────────────────────────────────────────────────────────

/// Write side of one HTTP exchange.
pub trait ResponseWriter: Send {
    /// Headers that will be sent with the status. Edits after the status is
    /// committed are discarded.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Commits the status line. Only the first call has an effect.
    fn write_header(&mut self, status: StatusCode);

    /// Appends body bytes, committing `200 OK` first if nothing was committed.
    fn write(&mut self, buf: &[u8]);
}

/// Replies with a plain-text error: `message` plus a trailing newline.
pub fn http_error(res: &mut dyn ResponseWriter, message: &str, status: StatusCode) {
    let headers = res.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    res.write_header(status);
    res.write(message.as_bytes());
    res.write(b"\n");
}

// ── Response ─────────────────────────────────────────────────────────────────

/// Buffered response produced by one pipeline invocation.
///
/// ```rust
/// use http::StatusCode;
/// use weft::{Response, ResponseWriter};
///
/// let mut res = Response::new();
/// res.write_header(StatusCode::CREATED);
/// res.write_header(StatusCode::IM_A_TEAPOT); // ignored
/// res.write(b"made it");
///
/// assert_eq!(res.status(), StatusCode::CREATED);
/// assert_eq!(res.body(), b"made it");
/// ```
#[derive(Debug, Default)]
pub struct Response {
    status: Option<StatusCode>,
    // Live until the status is committed; afterwards a scratch map whose
    // edits are dropped.
    headers: HeaderMap,
    committed: Option<HeaderMap>,
    body: BytesMut,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed status, or `200 OK` if nothing was written.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// Whether a status has been committed.
    pub fn is_committed(&self) -> bool {
        self.status.is_some()
    }

    /// Headers as they will be sent.
    pub fn headers(&self) -> &HeaderMap {
        self.committed.as_ref().unwrap_or(&self.headers)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Converts into the `http` response the server writes back.
    pub fn into_inner(self) -> http::Response<Full<Bytes>> {
        let status = self.status();
        let headers = self.committed.unwrap_or(self.headers);
        let mut res = http::Response::new(Full::new(self.body.freeze()));
        *res.status_mut() = status;
        *res.headers_mut() = headers;
        res
    }
}

impl ResponseWriter for Response {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        if let Some(current) = self.status {
            debug!(current = current.as_u16(), ignored = status.as_u16(), "superfluous write_header call");
            return;
        }
        self.status = Some(status);
        self.committed = Some(std::mem::take(&mut self.headers));
    }

    fn write(&mut self, buf: &[u8]) {
        if self.status.is_none() {
            self.write_header(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_commits_ok() {
        let mut res = Response::new();
        assert!(!res.is_committed());
        res.write(b"hi");
        assert!(res.is_committed());
        res.write_header(StatusCode::NOT_FOUND);
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn headers_freeze_at_commit() {
        let mut res = Response::new();
        res.headers_mut().insert("x-before", HeaderValue::from_static("1"));
        res.write_header(StatusCode::ACCEPTED);
        res.headers_mut().insert("x-after", HeaderValue::from_static("1"));

        assert!(res.headers().contains_key("x-before"));
        assert!(!res.headers().contains_key("x-after"));

        let inner = res.into_inner();
        assert_eq!(inner.status(), StatusCode::ACCEPTED);
        assert!(inner.headers().contains_key("x-before"));
        assert!(!inner.headers().contains_key("x-after"));
    }

    #[test]
    fn http_error_writes_plain_text() {
        let mut res = Response::new();
        http_error(&mut res, "bad input", StatusCode::BAD_REQUEST);

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(res.body(), b"bad input\n");
        assert_eq!(res.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(res.headers()[X_CONTENT_TYPE_OPTIONS], "nosniff");
    }

    #[test]
    fn http_error_after_commit_keeps_status_and_appends_body() {
        let mut res = Response::new();
        res.write_header(StatusCode::CREATED);
        http_error(&mut res, "late", StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.body(), b"late\n");
        assert!(!res.headers().contains_key(CONTENT_TYPE));
    }
}
