//! Structured logging for the built-in middleware.
//!
//! A [`Logger`] receives one [`Fields`] record per call and emits it
//! synchronously, stamped with a [`Level`] and a UTC timestamp. Loggers are
//! passed to middleware explicitly; there is no process-wide default.
//!
//! | Logger | Output |
//! |---|---|
//! | [`JsonLogger`] | one JSON object per line |
//! | [`TemplateLogger`] | one line rendered from a `{{field}}` template |
//! | [`TracingLogger`] | a `tracing` event per record |
//! | [`MemoryLogger`] | nothing; keeps records for inspection |

mod events;
mod json;
mod memory;
mod template;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

pub use events::TracingLogger;
pub use json::JsonLogger;
pub use memory::MemoryLogger;
pub use template::{DEFAULT_TEMPLATE, TemplateLogger};

/// A logger shared by every middleware instance that uses it.
pub type SharedLogger = Arc<dyn Logger>;

// ── Level ─────────────────────────────────────────────────────────────────────

/// Severity of a record.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Level {
    Info,
    Error,
}

impl Level {
    /// Lowercase name written into the `level` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info  => "info",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Fields ────────────────────────────────────────────────────────────────────

/// Named values making up one log record, ordered by key.
///
/// ```rust
/// use weft::Fields;
///
/// let fields = Fields::new()
///     .with("type", "request")
///     .with("code", "200");
/// assert_eq!(fields.get("code").and_then(|v| v.as_str()), Some("200"));
/// ```
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Fields {
    entries: BTreeMap<String, Value>,
    // First value that could not be represented. The record stays unemittable.
    #[serde(skip)]
    invalid: Option<String>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing any previous value under `key`.
    pub fn with(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds a field in place.
    ///
    /// A value that cannot be represented (for example a map with non-string
    /// keys) poisons the record: the logger refuses to emit it.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Serialize) {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(value) => {
                self.entries.insert(key, value);
            }
            Err(e) => {
                if self.invalid.is_none() {
                    self.invalid = Some(format!("field `{key}`: {e}"));
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// String value of `key`, if it holds a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Checks the record can be emitted.
    ///
    /// # Panics
    ///
    /// Panics if a field value could not be serialized.
    pub(crate) fn validate(mut self) -> Self {
        if let Some(reason) = self.invalid.take() {
            panic!("log record cannot be serialized: {reason}");
        }
        self
    }

    /// Validates the record and adds `level` and `time`.
    pub(crate) fn stamp(self, level: Level, time: DateTime<Utc>) -> Self {
        let mut fields = self.validate();
        fields.entries.insert("level".to_owned(), Value::from(level.as_str()));
        fields.entries.insert("time".to_owned(), Value::from(format_time(time)));
        fields
    }

    pub(crate) fn into_json(self) -> String {
        // A map of `Value`s always serializes.
        Value::Object(self.entries.into_iter().collect()).to_string()
    }
}

/// RFC 3339 in UTC, whole seconds, `Z` suffix: `2024-05-01T09:30:00Z`.
pub(crate) fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) type Clock = fn() -> DateTime<Utc>;

// ── Logger ────────────────────────────────────────────────────────────────────

/// A structured logger. Each call emits exactly one record.
///
/// Implementors only provide [`log`](Logger::log); it must be safe to call
/// from many requests at once.
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, fields: Fields);

    fn info(&self, fields: Fields) {
        self.log(Level::Info, fields);
    }

    fn error(&self, fields: Fields) {
        self.log(Level::Error, fields);
    }
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn log(&self, level: Level, fields: Fields) {
        (**self).log(level, fields);
    }
}
