//! Panic recovery.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use http::StatusCode;

use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::logger::{Fields, SharedLogger};
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::ResponseWriter;

/// Catches panics raised while the wrapped handler runs.
///
/// On a panic it logs `{type: "recovery", error: <panic message>}` at error
/// level, writes `500 Internal Server Error` (ignored if a status was already
/// committed) and returns `Ok(())`: the panic is absorbed, not turned into a
/// failure. Without a panic the handler's result passes through untouched.
///
/// The logged message is the panic payload's text when the payload is a
/// string, an [`Error`], an `anyhow::Error`, a `Box<dyn Display + Send + Sync>`
/// or a primitive number, `bool` or `char`. Any other payload is logged as
/// `"unknown panic"`.
///
/// Recovery does not touch the process panic hook, so the hook still reports
/// each panic (by default on stderr). Install a quieter one with
/// [`std::panic::set_hook`] if that is unwanted.
///
/// The guard covers the wrapped future only. Panics in tasks the handler
/// spawns surface through their own `JoinHandle`, not here.
///
/// Put it outermost so it guards every layer inside it.
pub struct Recovery {
    logger: SharedLogger,
}

impl Recovery {
    pub fn new(logger: SharedLogger) -> Self {
        Self { logger }
    }
}

impl Middleware for Recovery {
    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(RecoveryHandler { logger: Arc::clone(&self.logger), next })
    }
}

struct RecoveryHandler {
    logger: SharedLogger,
    next: BoxedHandler,
}

impl Handler for RecoveryHandler {
    fn call<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut dyn ResponseWriter,
    ) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            // The request and writer may be left half-updated by the panic;
            // only the status write below touches them afterwards.
            let outcome = AssertUnwindSafe(self.next.call(req, res)).catch_unwind().await;

            match outcome {
                Ok(result) => result,
                Err(payload) => {
                    self.logger.error(
                        Fields::new()
                            .with("type", "recovery")
                            .with("error", panic_message(&*payload)),
                    );
                    res.write_header(StatusCode::INTERNAL_SERVER_ERROR);
                    Ok(())
                }
            }
        })
    }
}

/// Text of a panic payload, or `"unknown panic"` for types with no known
/// textual form.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    macro_rules! display_as {
        ($($ty:ty),+ $(,)?) => {
            $(
                if let Some(value) = payload.downcast_ref::<$ty>() {
                    return value.to_string();
                }
            )+
        };
    }

    display_as![
        &str, String, Error, anyhow::Error, Box<dyn fmt::Display + Send + Sync>,
        i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
    ];
    "unknown panic".to_owned()
}
