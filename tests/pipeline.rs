//! End-to-end behaviour of composed pipelines through the public API.

use std::sync::Arc;

use bytes::Bytes;
use http::header::HOST;
use http::{Method, StatusCode, Uri};
use parking_lot::Mutex;
use weft::{
    BoxedHandler, BoxedMiddleware, Chain, Config, Endpoint, Error, ErrorHandling, ErrorLogging,
    Handler, Level, MemoryLogger, Middleware, Pipeline, Recovery, Request, RequestLogging,
    Response, ResponseWriter, chain, default_chain, handler_fn, wrap,
};

type Trace = Arc<Mutex<Vec<String>>>;

/// Request-scoped trace carried in the request extensions.
#[derive(Clone, Default)]
struct Log(Trace);

impl Log {
    fn push(req: &Request, entry: impl Into<String>) {
        if let Some(log) = req.extensions().get::<Log>() {
            log.0.lock().push(entry.into());
        }
    }
}

fn marker(name: &'static str, fail: Option<&'static str>) -> impl Middleware {
    move |next: BoxedHandler| -> BoxedHandler {
        Arc::new(handler_fn(move |req, res| {
            let next = Arc::clone(&next);
            Box::pin(async move {
                Log::push(req, name);
                next.call(req, res).await?;
                match fail {
                    Some(msg) => Err(Error::msg(msg)),
                    None => Ok(()),
                }
            })
        }))
    }
}

fn layer(name: &'static str) -> BoxedMiddleware {
    Arc::new(marker(name, None))
}

fn terminal(name: &'static str, fail: Option<&'static str>) -> impl Handler {
    handler_fn(move |req, _res| {
        Box::pin(async move {
            Log::push(req, name);
            match fail {
                Some(msg) => Err(Error::msg(msg)),
                None => Ok(()),
            }
        })
    })
}

fn request(path: &'static str) -> (Request, Trace) {
    let trace = Trace::default();
    let mut req = Request::from(
        http::Request::get(path)
            .header(HOST, "example.com")
            .body(Bytes::new())
            .unwrap(),
    );
    req.extensions_mut().insert(Log(Arc::clone(&trace)));
    (req, trace)
}

async fn serve(pipeline: &Pipeline, path: &'static str) -> (Response, Vec<String>) {
    let (mut req, trace) = request(path);
    let mut res = Response::new();
    pipeline.serve(&mut req, &mut res).await;
    let trace = trace.lock().clone();
    (res, trace)
}

#[tokio::test]
async fn layers_run_in_registration_order() {
    let cases: [(&[&str], &str); 4] = [
        (&[], "h"),
        (&["a"], "ah"),
        (&["a", "b"], "abh"),
        (&["a", "b", "c"], "abch"),
    ];

    for (names, expected) in cases {
        let chain = Chain::new(names.iter().copied().map(layer));
        let (res, trace) = serve(&chain.then(terminal("h", None)), "/").await;

        assert_eq!(trace.concat(), expected);
        assert_eq!(res.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn append_matches_flat_composition() {
    let err = Some("error");
    let appended = Chain::new([layer("a")])
        .append([Arc::new(marker("b", err)) as BoxedMiddleware, layer("c")]);
    let flat = chain![marker("a", None), marker("b", err), marker("c", None)];

    for chain in [appended, flat] {
        let handler = chain.apply(Arc::new(terminal("d", None)));
        let (mut req, trace) = request("/");
        let err = handler.call(&mut req, &mut Response::new()).await.unwrap_err();

        assert_eq!(err.to_string(), "error");
        assert_eq!(trace.lock().concat(), "abcd");
    }
}

#[tokio::test]
async fn residual_failures_become_500() {
    let pipeline = chain![marker("a", None)].then(terminal("b", Some("error")));
    let (res, trace) = serve(&pipeline, "/").await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.body().is_empty());
    assert_eq!(trace.concat(), "ab");
}

#[tokio::test]
async fn default_chain_translates_status_errors() {
    let requests = Arc::new(MemoryLogger::new());
    let errors = Arc::new(MemoryLogger::new());
    let config = Config::default()
        .with_request_logger(Arc::clone(&requests))
        .with_error_logger(Arc::clone(&errors));

    let pipeline = default_chain(&config).then(handler_fn(|_req, _res| {
        Box::pin(async move { Err(Error::msg("bad").with_status(StatusCode::BAD_REQUEST)) })
    }));
    let (res, _) = serve(&pipeline, "/users").await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.body(), b"bad\n");

    let logged = errors.records_at(Level::Error);
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].get_str("type"), Some("error"));
    assert_eq!(logged[0].get_str("error"), Some("bad"));

    let access = requests.records_at(Level::Info);
    assert_eq!(access.len(), 1);
    assert_eq!(access[0].get_str("path"), Some("/users"));
    assert_eq!(access[0].get_str("host"), Some("example.com"));
    assert_eq!(access[0].get_str("method"), Some("GET"));
    assert_eq!(access[0].get_str("code"), Some("400"));
    assert_eq!(access[0].get_str("written"), Some("4"));
}

#[tokio::test]
async fn default_chain_recovers_from_panics() {
    let logger = Arc::new(MemoryLogger::new());
    let pipeline = default_chain(&Config::new(Arc::clone(&logger))).then(handler_fn(|_req, _res| {
        Box::pin(async move { panic!("boom") })
    }));
    let (res, _) = serve(&pipeline, "/").await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.body().is_empty());

    // The panic unwinds past RequestLogging, so only Recovery logs.
    let records = logger.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, Level::Error);
    assert_eq!(records[0].1.get_str("type"), Some("recovery"));
    assert_eq!(records[0].1.get_str("error"), Some("boom"));
}

#[tokio::test]
async fn error_logging_outside_error_handling_sees_nothing() {
    let logger = Arc::new(MemoryLogger::new());
    let pipeline = chain![ErrorLogging::new(logger.clone()), ErrorHandling::new()]
        .then(terminal("h", Some("swallowed")));
    let (res, _) = serve(&pipeline, "/").await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body(), b"swallowed\n");
    assert!(logger.records().is_empty());
}

#[tokio::test]
async fn wrapped_pipelines_nest() {
    let logger = Arc::new(MemoryLogger::new());

    // Inner pipeline: handles its own failures.
    let inner = chain![ErrorHandling::new(), ErrorLogging::new(logger.clone())]
        .with(marker("m", None))
        .then(handler_fn(|req, res| {
            Box::pin(async move {
                if req.path() == "/missing" {
                    return Err(Error::msg("not found").with_status(StatusCode::NOT_FOUND));
                }
                res.write(b"hello handler!\n");
                Ok(())
            })
        }));

    // Outer pipeline: recovery and access logging around the inner one.
    let outer = chain![Recovery::new(logger.clone()), RequestLogging::new(logger.clone())]
        .then(wrap(inner));

    let (res, trace) = serve(&outer, "/").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.body(), b"hello handler!\n");
    assert_eq!(trace, ["m"]);

    let (res, _) = serve(&outer, "/missing").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.body(), b"not found\n");

    let records = logger.records();
    let kinds: Vec<_> = records.iter().map(|(_, f)| f.get_str("type").unwrap_or_default()).collect();
    assert_eq!(kinds, ["request", "error", "request"]);
    assert_eq!(records[2].1.get_str("code"), Some("404"));
}

#[tokio::test]
async fn binding_twice_gives_independent_pipelines() {
    let chain = chain![ErrorHandling::new()];
    let handler: BoxedHandler = Arc::new(handler_fn(|req, res| {
        Box::pin(async move {
            let hits = req.extensions().get::<Log>().map(|l| l.0.lock().len()).unwrap_or_default();
            Log::push(req, "hit");
            res.write(format!("{hits}").as_bytes());
            Ok(())
        })
    }));

    let first = chain.then(Arc::clone(&handler));
    let second = chain.then(handler).on_failure(|res, _req, _err| res.write_header(StatusCode::BAD_GATEWAY));

    let (a, _) = serve(&first, "/").await;
    let (b, _) = serve(&second, "/").await;

    assert_eq!(a.status(), b.status());
    assert_eq!(a.body(), b.body());
    assert_eq!(a.body(), b"0");
}

#[tokio::test]
async fn concurrent_requests_do_not_share_state() {
    let logger = Arc::new(MemoryLogger::new());
    let pipeline = Arc::new(default_chain(&Config::new(Arc::clone(&logger))).then(handler_fn(|req, res| {
        Box::pin(async move {
            tokio::task::yield_now().await;
            let path = req.path().to_owned();
            res.write(path.as_bytes());
            Ok(())
        })
    })));

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..16 {
        let pipeline = Arc::clone(&pipeline);
        tasks.spawn(async move {
            let mut req = Request::new(Method::GET, format!("/r/{i}").parse::<Uri>().unwrap());
            let mut res = Response::new();
            pipeline.serve(&mut req, &mut res).await;
            (i, res)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (i, res) = joined.unwrap();
        assert_eq!(res.body(), format!("/r/{i}").as_bytes());
    }
    assert_eq!(logger.records_at(Level::Info).len(), 16);
}
