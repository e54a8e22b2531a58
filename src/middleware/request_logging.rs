//! Per-request access log.

use std::sync::Arc;
use std::time::Instant;

use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::logger::{Fields, SharedLogger};
use crate::middleware::{CaptureWriter, Middleware};
use crate::request::Request;
use crate::response::ResponseWriter;

/// Logs one info record per request once the wrapped handler returns:
///
/// ```text
/// {type: "request", host, method, path, code, duration, written}
/// ```
///
/// `path` is read before delegating, since inner layers may rewrite it.
/// `code`, `duration` and `written` come from a [`CaptureWriter`] around the
/// response. The middleware never writes to the response and returns the
/// handler's result unchanged.
pub struct RequestLogging {
    logger: SharedLogger,
}

impl RequestLogging {
    pub fn new(logger: SharedLogger) -> Self {
        Self { logger }
    }
}

impl Middleware for RequestLogging {
    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(RequestLoggingHandler { logger: Arc::clone(&self.logger), next })
    }
}

struct RequestLoggingHandler {
    logger: SharedLogger,
    next: BoxedHandler,
}

impl Handler for RequestLoggingHandler {
    fn call<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut dyn ResponseWriter,
    ) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            let fields = Fields::new()
                .with("type", "request")
                .with("host", req.host())
                .with("method", req.method().as_str())
                .with("path", req.path());

            let started = Instant::now();
            let mut capture = CaptureWriter::new(res);
            let result = self.next.call(req, &mut capture).await;
            let elapsed = started.elapsed();

            self.logger.info(
                fields
                    .with("code", capture.status().as_u16().to_string())
                    .with("duration", format!("{elapsed:?}"))
                    .with("written", capture.written().to_string()),
            );
            result
        })
    }
}
