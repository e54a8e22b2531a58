//! Handler traits and type erasure.
//!
//! Two shapes of request handler exist:
//!
//! - [`Handler`]: fallible. Returns `Result<(), Error>`; middleware layers see
//!   the failure on the way out and may log or translate it.
//! - [`Endpoint`]: transport-native. Returns nothing; by the time it finishes
//!   every outcome has been written to the response. [`Server`](crate::Server)
//!   serves an `Endpoint`, and a bound [`Pipeline`](crate::Pipeline) is one.
//!
//! [`wrap`] adapts an `Endpoint` into a `Handler` that always succeeds.
//!
//! # How handlers are stored
//!
//! Layers hold the handler they wrap as a [`BoxedHandler`]:
//!
//! ```text
//! handler_fn(|req, res| Box::pin(async move { … }))   ← user writes this
//!        ↓ chain.then(handler)
//! Arc::new(handler) as Arc<dyn Handler>               ← one allocation, at bind time
//!        ↓ each middleware's `apply` wraps it once
//! Arc<dyn Handler> (outermost layer)
//!        ↓ per request
//! handler.call(&mut req, &mut res)                    ← one virtual call per layer
//! ```
//!
//! Closures are built once when the pipeline is bound, never per request.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Error;
use crate::request::Request;
use crate::response::ResponseWriter;

/// A heap-allocated, type-erased future borrowing the request exchange.
///
/// `'a` ties the future to the `&mut Request` / `&mut dyn ResponseWriter` it
/// was created from, so handlers can use both across `.await` points.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A type-erased handler shared by every request flowing through a pipeline.
pub type BoxedHandler = Arc<dyn Handler>;

// ── Handler ───────────────────────────────────────────────────────────────────

/// A unit of work for one request that may fail.
///
/// Implement it directly for handler types that carry state; use
/// [`handler_fn`] for closures.
pub trait Handler: Send + Sync + 'static {
    fn call<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut dyn ResponseWriter,
    ) -> BoxFuture<'a, Result<(), Error>>;
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn call<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut dyn ResponseWriter,
    ) -> BoxFuture<'a, Result<(), Error>> {
        (**self).call(req, res)
    }
}

/// Builds a [`Handler`] from a closure.
///
/// ```rust
/// use weft::{handler_fn, Error, ResponseWriter};
///
/// let hello = handler_fn(|req, res| Box::pin(async move {
///     if req.path() == "/forbidden" {
///         return Err(Error::msg("no").with_status(http::StatusCode::FORBIDDEN));
///     }
///     res.write(b"hello\n");
///     Ok(())
/// }));
/// # let _ = hello;
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut dyn ResponseWriter) -> BoxFuture<'a, Result<(), Error>>
        + Send
        + Sync
        + 'static,
{
    FnHandler(f)
}

/// Newtype returned by [`handler_fn`], bridging closures to [`Handler`].
pub struct FnHandler<F>(F);

impl<F> Handler for FnHandler<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut dyn ResponseWriter) -> BoxFuture<'a, Result<(), Error>>
        + Send
        + Sync
        + 'static,
{
    fn call<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut dyn ResponseWriter,
    ) -> BoxFuture<'a, Result<(), Error>> {
        (self.0)(req, res)
    }
}

// ── Endpoint ──────────────────────────────────────────────────────────────────

/// A transport-native handler: it reports every outcome through the response.
pub trait Endpoint: Send + Sync + 'static {
    fn serve<'a>(&'a self, req: &'a mut Request, res: &'a mut dyn ResponseWriter) -> BoxFuture<'a, ()>;
}

impl<E: Endpoint + ?Sized> Endpoint for Arc<E> {
    fn serve<'a>(&'a self, req: &'a mut Request, res: &'a mut dyn ResponseWriter) -> BoxFuture<'a, ()> {
        (**self).serve(req, res)
    }
}

/// Builds an [`Endpoint`] from a closure.
pub fn endpoint_fn<F>(f: F) -> FnEndpoint<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut dyn ResponseWriter) -> BoxFuture<'a, ()>
        + Send
        + Sync
        + 'static,
{
    FnEndpoint(f)
}

/// Newtype returned by [`endpoint_fn`].
pub struct FnEndpoint<F>(F);

impl<F> Endpoint for FnEndpoint<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut dyn ResponseWriter) -> BoxFuture<'a, ()>
        + Send
        + Sync
        + 'static,
{
    fn serve<'a>(&'a self, req: &'a mut Request, res: &'a mut dyn ResponseWriter) -> BoxFuture<'a, ()> {
        (self.0)(req, res)
    }
}

// ── Wrap ──────────────────────────────────────────────────────────────────────

/// Adapts an [`Endpoint`] so it can sit at the end of a middleware chain.
///
/// The resulting handler never fails: the endpoint has already written
/// whatever it had to say.
pub fn wrap<E: Endpoint>(endpoint: E) -> Wrapped<E> {
    Wrapped(endpoint)
}

/// Handler returned by [`wrap`].
pub struct Wrapped<E>(E);

impl<E: Endpoint> Handler for Wrapped<E> {
    fn call<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut dyn ResponseWriter,
    ) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            self.0.serve(req, res).await;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode, Uri};

    use super::*;
    use crate::response::Response;

    fn request() -> Request {
        Request::new(Method::GET, Uri::from_static("/"))
    }

    #[tokio::test]
    async fn wrap_always_succeeds() {
        for code in [StatusCode::OK, StatusCode::NOT_FOUND] {
            let endpoint = endpoint_fn(move |_req, res| Box::pin(async move {
                res.write_header(code);
            }));

            let mut res = Response::new();
            let result = wrap(endpoint).call(&mut request(), &mut res).await;

            assert!(result.is_ok());
            assert_eq!(res.status(), code);
        }
    }

    #[tokio::test]
    async fn handler_fn_returns_its_failure() {
        let handler = handler_fn(|_req, _res| Box::pin(async move {
            Err(Error::msg("nope"))
        }));

        let mut res = Response::new();
        let err = handler.call(&mut request(), &mut res).await.unwrap_err();

        assert_eq!(err.to_string(), "nope");
        assert!(!res.is_committed());
    }

    #[tokio::test]
    async fn arc_handler_delegates() {
        let handler: BoxedHandler = Arc::new(handler_fn(|_req, res| Box::pin(async move {
            res.write(b"shared");
            Ok(())
        })));

        let mut res = Response::new();
        Arc::clone(&handler).call(&mut request(), &mut res).await.unwrap();
        assert_eq!(res.body(), b"shared");
    }
}
