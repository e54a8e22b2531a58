//! Minimal weft example: two pipelines, one nested inside the other.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/
//!   curl -i http://localhost:3000/users/42
//!   curl -i http://localhost:3000/missing
//!   curl -i http://localhost:3000/panic
//!
//! Set `WEFT_LOG_FORMAT=template` (and optionally `WEFT_LOG_TEMPLATE`) to
//! switch the access log from JSON to a text template.

use std::sync::Arc;

use http::StatusCode;
use weft::{
    BoxedHandler, Config, Error, ErrorHandling, ErrorLogging, Recovery, RequestLogging,
    ResponseWriter, Server, chain, handler_fn, wrap,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    // Application pipeline: failures are logged, then turned into responses.
    let app = chain![ErrorHandling::new(), ErrorLogging::new(Arc::clone(&config.error_logger))]
        .with(banner)
        .then(handler_fn(|req, res| Box::pin(async move {
            match req.path() {
                "/" => {
                    res.write(b"hello handler!\n");
                    Ok(())
                }
                "/panic" => panic!("handler exploded"),
                path => match path.strip_prefix("/users/") {
                    Some(id) => {
                        res.headers_mut().insert("content-type", "application/json".parse()?);
                        res.write(format!(r#"{{"id":"{id}","name":"alice"}}"#).as_bytes());
                        Ok(())
                    }
                    None => Err(Error::msg(format!("{path} not found")).with_status(StatusCode::NOT_FOUND)),
                },
            }
        })));

    // Server pipeline: panic recovery and access logging around everything.
    let server = chain![
        Recovery::new(Arc::clone(&config.error_logger)),
        RequestLogging::new(Arc::clone(&config.request_logger)),
    ]
    .then(wrap(app));

    if let Err(e) = Server::bind(([0, 0, 0, 0], 3000)).serve(server).await {
        eprintln!("server error: {e}");
        std::process::exit(1);
    }
}

// Writes a line before delegating to the rest of the pipeline.
fn banner(next: BoxedHandler) -> BoxedHandler {
    Arc::new(handler_fn(move |req, res| {
        let next = Arc::clone(&next);
        Box::pin(async move {
            res.write(b"hello middleware!\n");
            next.call(req, res).await
        })
    }))
}
