//! Failure logging.

use std::sync::Arc;

use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::logger::{Fields, SharedLogger};
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::ResponseWriter;

/// Logs `{type: "error", error: <message>}` at error level when the wrapped
/// handler fails, then returns the failure unchanged.
///
/// Place it inside [`ErrorHandling`](crate::ErrorHandling) so it still sees
/// the failure before it is absorbed.
pub struct ErrorLogging {
    logger: SharedLogger,
}

impl ErrorLogging {
    pub fn new(logger: SharedLogger) -> Self {
        Self { logger }
    }
}

impl Middleware for ErrorLogging {
    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(ErrorLoggingHandler { logger: Arc::clone(&self.logger), next })
    }
}

struct ErrorLoggingHandler {
    logger: SharedLogger,
    next: BoxedHandler,
}

impl Handler for ErrorLoggingHandler {
    fn call<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut dyn ResponseWriter,
    ) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            let result = self.next.call(req, res).await;
            if let Err(err) = &result {
                self.logger.error(Fields::new().with("type", "error").with("error", err.to_string()));
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode, Uri};

    use super::*;
    use crate::handler::handler_fn;
    use crate::logger::{Level, MemoryLogger};
    use crate::response::Response;

    fn request() -> Request {
        Request::new(Method::GET, Uri::from_static("/"))
    }

    #[tokio::test]
    async fn success_logs_nothing() {
        let logger = Arc::new(MemoryLogger::new());
        let handler = ErrorLogging::new(logger.clone())
            .apply(Arc::new(handler_fn(|_req, _res| Box::pin(async move { Ok(()) }))));

        let result = handler.call(&mut request(), &mut Response::new()).await;

        assert!(result.is_ok());
        assert!(logger.records().is_empty());
    }

    #[tokio::test]
    async fn failure_is_logged_and_returned() {
        let logger = Arc::new(MemoryLogger::new());
        let handler = ErrorLogging::new(logger.clone()).apply(Arc::new(handler_fn(|_req, _res| {
            Box::pin(async move { Err(Error::msg("oops").with_status(StatusCode::GONE)) })
        })));

        let mut res = Response::new();
        let err = handler.call(&mut request(), &mut res).await.unwrap_err();

        assert_eq!(err.to_string(), "oops");
        assert_eq!(err.status(), Some(StatusCode::GONE));
        assert!(!res.is_committed());

        let records = logger.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, Level::Error);
        assert_eq!(records[0].1.get_str("type"), Some("error"));
        assert_eq!(records[0].1.get_str("error"), Some("oops"));
    }
}
