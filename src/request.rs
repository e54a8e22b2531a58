//! Incoming HTTP request type.

use bytes::Bytes;
use http::header::HOST;
use http::{Extensions, HeaderMap, Method, Uri};

/// An incoming HTTP request with its body already collected.
///
/// Handlers receive it as `&mut Request`: layers may rewrite the path or stash
/// request-scoped values in [`extensions_mut`](Request::extensions_mut) for the
/// layers and handler beneath them.
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) host: String,
    pub(crate) path: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) extensions: Extensions,
}

impl Request {
    /// A bodiless request, mostly useful in tests.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self::from_parts(method, uri, HeaderMap::new(), Bytes::new(), Extensions::new())
    }

    pub(crate) fn from_parts(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
        extensions: Extensions,
    ) -> Self {
        // Userinfo never reaches `host`.
        let host = uri.authority()
            .map(|a| match a.port() {
                Some(port) => format!("{}:{}", a.host(), port),
                None => a.host().to_owned(),
            })
            .or_else(|| headers.get(HOST).and_then(|v| v.to_str().ok()).map(str::to_owned))
            .unwrap_or_default();
        let path = uri.path().to_owned();
        Self { method, uri, host, path, headers, body, extensions }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn host(&self) -> &str { &self.host }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// The request path. Starts as the URI path; layers may rewrite it.
    pub fn path(&self) -> &str { &self.path }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self::from_parts(parts.method, parts.uri, parts.headers, body, parts.extensions)
    }
}
