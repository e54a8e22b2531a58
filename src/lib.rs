//! # weft
//!
//! Middleware pipelines for fallible HTTP handlers.
//!
//! A [`Handler`] does the work for one request and may return an [`Error`]
//! instead of writing a response. A [`Middleware`] wraps a handler in another
//! handler. A [`Chain`] stacks middleware in order and, bound to a terminal
//! handler with [`Chain::then`], becomes a [`Pipeline`] the [`Server`] can
//! serve.
//!
//! ## The contract
//!
//! - **Order.** The first layer of a chain is the outermost: its "before" code
//!   runs first and its "after" code runs last.
//! - **One place for failures.** A failure travels back out through every
//!   layer. [`ErrorLogging`] records it, [`ErrorHandling`] turns it into a
//!   response using [`status_code`], and whatever still escapes is handed to
//!   the pipeline's failure policy.
//! - **Panics stay local.** [`Recovery`] catches panics raised inside the
//!   layers it wraps, logs them, and answers `500`.
//! - **Observable.** [`RequestLogging`] emits one structured record per
//!   request through an explicit [`Logger`]; there is no global logger.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use weft::{default_chain, handler_fn, Config, Error, ResponseWriter, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = default_chain(&Config::default()).then(handler_fn(|req, res| Box::pin(async move {
//!         if req.path() != "/" {
//!             return Err(Error::msg("not found").with_status(StatusCode::NOT_FOUND));
//!         }
//!         res.write(b"hello\n");
//!         Ok(())
//!     })));
//!
//!     Server::bind(([0, 0, 0, 0], 3000)).serve(app).await.unwrap();
//! }
//! ```

mod chain;
mod config;
mod error;
mod handler;
mod request;
mod response;
mod server;

pub mod logger;
pub mod middleware;

pub use chain::{Chain, FailurePolicy, Pipeline, default_chain};
pub use config::Config;
pub use error::{ConfigError, Error, ServeError, status_code};
pub use handler::{
    BoxFuture, BoxedHandler, Endpoint, FnEndpoint, FnHandler, Handler, Wrapped, endpoint_fn,
    handler_fn, wrap,
};
pub use logger::{
    Fields, JsonLogger, Level, Logger, MemoryLogger, SharedLogger, TemplateLogger, TracingLogger,
};
pub use middleware::{
    BoxedMiddleware, ErrorHandling, ErrorLogging, Middleware, Recovery, RequestLogging,
};
pub use request::Request;
pub use response::{Response, ResponseWriter, http_error};
pub use server::Server;

/// Builds a [`Chain`] from middleware values, first one outermost.
///
/// ```rust
/// use std::sync::Arc;
/// use weft::{chain, ErrorHandling, ErrorLogging, MemoryLogger};
///
/// let logger = Arc::new(MemoryLogger::new());
/// let errors = chain![ErrorHandling::new(), ErrorLogging::new(logger)];
/// assert_eq!(errors.len(), 2);
/// assert!(chain![].is_empty());
/// ```
#[macro_export]
macro_rules! chain {
    () => {
        $crate::Chain::default()
    };
    ($($layer:expr),+ $(,)?) => {
        $crate::Chain::new([
            $(::std::sync::Arc::new($layer) as $crate::BoxedMiddleware),+
        ])
    };
}
