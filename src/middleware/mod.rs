//! Middleware layer.
//!
//! A [`Middleware`] turns one [`Handler`](crate::Handler) into another. It is
//! the place for cross-cutting concerns: panic recovery, request logging,
//! failure translation. Layers are composed with a [`Chain`](crate::Chain).
//!
//! Built-in middleware, in the order [`default_chain`](crate::default_chain)
//! stacks them (outermost first):
//!
//! | Layer | Before `next` | After `next` | Failure channel |
//! |---|---|---|---|
//! | [`Recovery`] | installs a panic guard | on panic: logs, writes 500 | absorbs panics only |
//! | [`RequestLogging`] | captures the path, starts a timer | logs one `request` record | passes through |
//! | [`ErrorHandling`] | | writes the failure as the response | absorbs |
//! | [`ErrorLogging`] | | logs one `error` record | passes through |
//!
//! Any `Fn(BoxedHandler) -> BoxedHandler` closure is a middleware too:
//!
//! ```rust
//! use std::sync::Arc;
//! use weft::{handler_fn, BoxedHandler, Chain, ResponseWriter};
//!
//! let banner = |next: BoxedHandler| -> BoxedHandler {
//!     Arc::new(handler_fn(move |req, res| {
//!         let next = Arc::clone(&next);
//!         Box::pin(async move {
//!             res.write(b"hello middleware!\n");
//!             next.call(req, res).await
//!         })
//!     }))
//! };
//!
//! let chain = Chain::default().with(banner);
//! # let _ = chain;
//! ```

mod capture;
mod error_handling;
mod error_logging;
mod recovery;
mod request_logging;

use std::sync::Arc;

use crate::handler::BoxedHandler;

pub use capture::CaptureWriter;
pub use error_handling::ErrorHandling;
pub use error_logging::ErrorLogging;
pub use recovery::Recovery;
pub use request_logging::RequestLogging;

/// A type-erased middleware, as stored in a [`Chain`](crate::Chain).
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// Wraps a handler in another handler.
///
/// `apply` runs once, when a pipeline is bound; the handler it returns runs
/// once per request. The returned handler should call `next` at most once
/// per request. The built-ins always call it.
pub trait Middleware: Send + Sync + 'static {
    fn apply(&self, next: BoxedHandler) -> BoxedHandler;
}

impl<F> Middleware for F
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
{
    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        self(next)
    }
}
