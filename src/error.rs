//! Error types.
//!
//! [`Error`] is the failure value a [`Handler`](crate::Handler) returns. It may
//! carry an HTTP status; [`status_code`] turns any outcome into the code the
//! client should see.
//!
//! [`ServeError`] and [`ConfigError`] surface infrastructure failures and never
//! travel through a pipeline.

use std::fmt;

use http::StatusCode;

// ── Handler failure ───────────────────────────────────────────────────────────

/// A handler failure, optionally tagged with the status it should produce.
///
/// Any `std::error::Error + Send + Sync + 'static` converts into `Error`, so
/// handlers can use `?` freely:
///
/// ```rust
/// use http::StatusCode;
/// use weft::{Error, status_code};
///
/// let plain = Error::msg("database unavailable");
/// assert_eq!(status_code(Some(&plain)), StatusCode::INTERNAL_SERVER_ERROR);
///
/// let missing = Error::msg("no such user").with_status(StatusCode::NOT_FOUND);
/// assert_eq!(status_code(Some(&missing)), StatusCode::NOT_FOUND);
/// assert_eq!(missing.to_string(), "no such user");
/// ```
///
/// Like `anyhow::Error`, this type does not itself implement
/// `std::error::Error`; that is what makes the blanket `From` impl coherent.
pub struct Error {
    status: Option<StatusCode>,
    inner: anyhow::Error,
}

impl Error {
    /// Wraps an existing error value.
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self { status: None, inner: anyhow::Error::new(err) }
    }

    /// Creates an error from a printable message.
    pub fn msg<M>(message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self { status: None, inner: anyhow::Error::msg(message) }
    }

    /// Attaches (or replaces) the status this failure maps to.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// The attached status, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Returns the underlying error if it is of type `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.inner.downcast_ref::<E>()
    }

    pub fn into_inner(self) -> anyhow::Error {
        self.inner
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "[{}] {:?}", status.as_u16(), self.inner),
            None => fmt::Debug::fmt(&self.inner, f),
        }
    }
}

impl<E> From<E> for Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::new(err)
    }
}

/// Maps a handler outcome to the status reported to the client.
///
/// - `None` → `200 OK`
/// - a failure without a status → `500 Internal Server Error`
/// - a failure with a status → that status
pub fn status_code(err: Option<&Error>) -> StatusCode {
    match err {
        None => StatusCode::OK,
        Some(err) => err.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

// ── Server failure ────────────────────────────────────────────────────────────

/// Failure to bind or run the [`Server`](crate::Server).
#[derive(Debug)]
pub struct ServeError(std::io::Error);

impl fmt::Display for ServeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "io: {}", self.0)
    }
}

impl std::error::Error for ServeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<std::io::Error> for ServeError {
    fn from(e: std::io::Error) -> Self {
        Self(e)
    }
}

// ── Configuration failure ─────────────────────────────────────────────────────

/// An environment variable held a value [`Config`](crate::Config) cannot use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub(crate) key: &'static str,
    pub(crate) value: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value `{}` for {}", self.value, self.key)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_is_total() {
        assert_eq!(status_code(None), StatusCode::OK);
        assert_eq!(status_code(Some(&Error::msg("plain"))), StatusCode::INTERNAL_SERVER_ERROR);

        let err = Error::msg("gone").with_status(StatusCode::NOT_FOUND);
        assert_eq!(status_code(Some(&err)), StatusCode::NOT_FOUND);
    }

    #[test]
    fn with_status_replaces_previous_status() {
        let err = Error::msg("x")
            .with_status(StatusCode::BAD_REQUEST)
            .with_status(StatusCode::CONFLICT);
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    }

    #[test]
    fn converts_std_errors_and_keeps_message() {
        fn read() -> Result<(), Error> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing file"))?;
            Ok(())
        }

        let err = read().unwrap_err();
        assert_eq!(err.to_string(), "missing file");
        assert_eq!(err.status(), None);
        assert!(err.downcast_ref::<std::io::Error>().is_some());
    }
}
