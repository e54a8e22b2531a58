//! Middleware composition and pipeline binding.
//!
//! A [`Chain`] is an ordered list of middleware that behaves as a single
//! middleware. Binding it to a handler with [`Chain::then`] yields a
//! [`Pipeline`], the [`Endpoint`] a server can serve.
//!
//! # Ordering
//!
//! The first layer is the outermost. For `chain![a, b, c].then(h)` a request
//! runs:
//!
//! ```text
//! a before → b before → c before → h → c after → b after → a after
//! ```
//!
//! # Cost
//!
//! Layers are folded right-to-left into nested handlers once, inside
//! [`then`](Chain::then). A request pays one virtual call per layer and
//! allocates nothing for the composition itself.

use std::sync::Arc;

use http::StatusCode;

use crate::config::Config;
use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, Endpoint, Handler};
use crate::middleware::{
    BoxedMiddleware, ErrorHandling, ErrorLogging, Middleware, Recovery, RequestLogging,
};
use crate::request::Request;
use crate::response::ResponseWriter;

// ── Chain ─────────────────────────────────────────────────────────────────────

/// An ordered, composable stack of middleware.
///
/// ```rust
/// use std::sync::Arc;
/// use weft::{chain, handler_fn, ErrorHandling, ErrorLogging, MemoryLogger, Recovery};
///
/// let logger = Arc::new(MemoryLogger::new());
///
/// let errors = chain![ErrorHandling::new(), ErrorLogging::new(logger.clone())];
/// let app = chain![Recovery::new(logger)]
///     .append([Arc::new(errors) as weft::BoxedMiddleware])
///     .then(handler_fn(|_req, res| Box::pin(async move {
///         weft::ResponseWriter::write(res, b"hello handler!\n");
///         Ok(())
///     })));
/// # let _ = app;
/// ```
#[derive(Clone, Default)]
pub struct Chain {
    layers: Vec<BoxedMiddleware>,
}

impl Chain {
    /// Composes `layers`, first one outermost. No layers is the identity.
    pub fn new(layers: impl IntoIterator<Item = BoxedMiddleware>) -> Self {
        Self { layers: layers.into_iter().collect() }
    }

    /// Adds one layer inside every existing one.
    pub fn with(mut self, layer: impl Middleware) -> Self {
        self.layers.push(Arc::new(layer));
        self
    }

    /// Adds `more` inside every existing layer, keeping their order.
    ///
    /// Appending nothing returns the chain unchanged.
    pub fn append(mut self, more: impl IntoIterator<Item = BoxedMiddleware>) -> Self {
        self.layers.extend(more);
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Terminates the chain with `handler`.
    ///
    /// The returned pipeline answers residual failures with a bare
    /// `500 Internal Server Error`; see [`Pipeline::on_failure`].
    pub fn then(&self, handler: impl Handler) -> Pipeline {
        Pipeline {
            entry: self.apply(Arc::new(handler)),
            on_failure: Arc::new(default_failure),
        }
    }
}

impl Middleware for Chain {
    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        self.layers.iter().rev().fold(next, |inner, layer| layer.apply(inner))
    }
}

/// Recovery, RequestLogging, ErrorHandling, ErrorLogging, outermost first.
///
/// ErrorHandling wraps ErrorLogging, so failures are logged before they are
/// turned into responses; Recovery guards all of them.
pub fn default_chain(config: &Config) -> Chain {
    Chain::new([
        Arc::new(Recovery::new(Arc::clone(&config.error_logger))) as BoxedMiddleware,
        Arc::new(RequestLogging::new(Arc::clone(&config.request_logger))),
        Arc::new(ErrorHandling::new()),
        Arc::new(ErrorLogging::new(Arc::clone(&config.error_logger))),
    ])
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Decides what the client sees when a failure escapes every layer.
pub type FailurePolicy = Arc<dyn Fn(&mut dyn ResponseWriter, &Request, &Error) + Send + Sync>;

fn default_failure(res: &mut dyn ResponseWriter, _req: &Request, _err: &Error) {
    res.write_header(StatusCode::INTERNAL_SERVER_ERROR);
}

/// A chain bound to its terminal handler.
///
/// Serve it directly, or [`wrap`](crate::wrap) it to nest inside another chain.
/// Cloning is cheap and clones share the composed handler.
#[derive(Clone)]
pub struct Pipeline {
    entry: BoxedHandler,
    on_failure: FailurePolicy,
}

impl Pipeline {
    /// Replaces the failure policy.
    ///
    /// ```rust
    /// use http::StatusCode;
    /// use weft::{handler_fn, http_error, status_code, Chain, Error};
    ///
    /// let pipeline = Chain::default()
    ///     .then(handler_fn(|_req, _res| Box::pin(async move {
    ///         Err(Error::msg("teapot").with_status(StatusCode::IM_A_TEAPOT))
    ///     })))
    ///     .on_failure(|res, _req, err| http_error(res, &err.to_string(), status_code(Some(err))));
    /// # let _ = pipeline;
    /// ```
    pub fn on_failure<F>(mut self, policy: F) -> Self
    where
        F: Fn(&mut dyn ResponseWriter, &Request, &Error) + Send + Sync + 'static,
    {
        self.set_on_failure(policy);
        self
    }

    pub fn set_on_failure<F>(&mut self, policy: F)
    where
        F: Fn(&mut dyn ResponseWriter, &Request, &Error) + Send + Sync + 'static,
    {
        self.on_failure = Arc::new(policy);
    }
}

impl Endpoint for Pipeline {
    fn serve<'a>(&'a self, req: &'a mut Request, res: &'a mut dyn ResponseWriter) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let result = self.entry.call(req, res).await;
            if let Err(err) = result {
                (self.on_failure)(res, req, &err);
            }
        })
    }
}
