//! Line-delimited JSON logger.

use std::io::{self, Write};

use chrono::Utc;
use parking_lot::Mutex;
use tracing::warn;

use super::{Clock, Fields, Level, Logger};

/// Writes each record as one JSON object on its own line.
///
/// ```text
/// {"code":"200","duration":"1.2ms","host":"example.com","level":"info","method":"GET",…}
/// ```
///
/// Keys are sorted. The sink is locked for the duration of one write, so
/// records from concurrent requests never interleave.
pub struct JsonLogger<W> {
    sink: Mutex<W>,
    clock: Clock,
}

impl JsonLogger<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonLogger<W> {
    pub fn new(sink: W) -> Self {
        Self { sink: Mutex::new(sink), clock: Utc::now }
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the sink, e.g. to inspect a buffer in tests.
    pub fn into_inner(self) -> W {
        self.sink.into_inner()
    }
}

impl<W: Write + Send> Logger for JsonLogger<W> {
    fn log(&self, level: Level, fields: Fields) {
        let mut line = fields.stamp(level, (self.clock)()).into_json();
        line.push('\n');

        let mut sink = self.sink.lock();
        if let Err(e) = sink.write_all(line.as_bytes()).and_then(|()| sink.flush()) {
            warn!("dropping log record: {e}");
        }
    }
}
