//! Response-writer interception for metrics.

use http::{HeaderMap, StatusCode};

use crate::response::ResponseWriter;

/// Forwards every call to an inner writer while recording what went through.
///
/// The recorded status is the first one committed, `200 OK` if the body was
/// written without one, or `200 OK` if nothing was written at all.
pub struct CaptureWriter<'a> {
    inner: &'a mut dyn ResponseWriter,
    status: Option<StatusCode>,
    written: u64,
}

impl<'a> CaptureWriter<'a> {
    pub fn new(inner: &'a mut dyn ResponseWriter) -> Self {
        Self { inner, status: None, written: 0 }
    }

    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// Body bytes written through this writer.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl ResponseWriter for CaptureWriter<'_> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
        self.inner.write_header(status);
    }

    fn write(&mut self, buf: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.written += buf.len() as u64;
        self.inner.write(buf);
    }
}
