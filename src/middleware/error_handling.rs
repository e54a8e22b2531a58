//! Failure translation.

use std::sync::Arc;

use crate::error::{Error, status_code};
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::{ResponseWriter, http_error};

/// Turns a handler failure into a plain-text response.
///
/// The body is the failure's message plus a newline; the status comes from
/// [`status_code`]. The failure is absorbed: this layer always returns
/// `Ok(())`. A successful handler is left alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorHandling;

impl ErrorHandling {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for ErrorHandling {
    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(ErrorHandlingHandler { next })
    }
}

struct ErrorHandlingHandler {
    next: BoxedHandler,
}

impl Handler for ErrorHandlingHandler {
    fn call<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut dyn ResponseWriter,
    ) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            let result = self.next.call(req, res).await;
            if let Err(err) = result {
                http_error(res, &err.to_string(), status_code(Some(&err)));
            }
            Ok(())
        })
    }
}
