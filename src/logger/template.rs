//! Logger that renders records through a `{{field}}` template.

use std::io::{self, Write};

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::warn;

use super::{Clock, Fields, Level, Logger};

/// Template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "{{time}} {{level}} {{type}} {{method}} {{path}} {{code}} {{error}}";

#[derive(Debug, PartialEq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// Renders each record through a template and writes it as one line.
///
/// `{{name}}` is replaced by the field `name`: strings as-is, other values as
/// JSON text. Placeholders with no matching field render as nothing. `level`
/// and `time` are always available.
///
/// ```rust
/// use weft::{Fields, Logger, TemplateLogger};
///
/// let logger = TemplateLogger::new(Vec::new(), "[{{level}}] {{type}}: {{error}}{{missing}}");
/// logger.error(Fields::new().with("type", "error").with("error", "oops"));
///
/// assert_eq!(String::from_utf8(logger.into_inner()).unwrap(), "[error] error: oops\n");
/// ```
pub struct TemplateLogger<W> {
    segments: Vec<Segment>,
    sink: Mutex<W>,
    clock: Clock,
}

impl TemplateLogger<io::Stdout> {
    pub fn stdout(template: &str) -> Self {
        Self::new(io::stdout(), template)
    }
}

impl<W: Write + Send> TemplateLogger<W> {
    pub fn new(sink: W, template: &str) -> Self {
        Self { segments: parse(template), sink: Mutex::new(sink), clock: Utc::now }
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn into_inner(self) -> W {
        self.sink.into_inner()
    }

    fn render(&self, fields: &Fields) -> String {
        let mut line = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Field(name) => match fields.get(name) {
                    Some(Value::String(s)) => line.push_str(s),
                    Some(Value::Null) | None => {}
                    Some(other) => line.push_str(&other.to_string()),
                },
            }
        }
        line.push('\n');
        line
    }
}

impl<W: Write + Send> Logger for TemplateLogger<W> {
    fn log(&self, level: Level, fields: Fields) {
        let fields = fields.stamp(level, (self.clock)());
        let line = self.render(&fields);

        let mut sink = self.sink.lock();
        if let Err(e) = sink.write_all(line.as_bytes()).and_then(|()| sink.flush()) {
            warn!("dropping log record: {e}");
        }
    }
}

/// Splits a template into literal text and `{{name}}` placeholders.
///
/// An unterminated `{{` is kept as literal text. Names are trimmed.
fn parse(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        literal.push_str(&rest[..start]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        let name = rest[start + 2..start + 2 + len].trim();
        segments.push(Segment::Field(name.to_owned()));
        rest = &rest[start + 2 + len + 2..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}
