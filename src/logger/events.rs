//! Logger that forwards records to `tracing`.

use super::{Fields, Level, Logger};

/// Emits every record as a `tracing` event with target `weft`.
///
/// The fields travel as one JSON-encoded `record` value; the subscriber adds
/// its own timestamp and level. Use this when the application already runs a
/// `tracing-subscriber` and wants middleware records in the same stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: Level, fields: Fields) {
        let record = fields.stamp(level, chrono::Utc::now()).into_json();
        match level {
            Level::Info  => tracing::info!(target: "weft", record = %record),
            Level::Error => tracing::error!(target: "weft", record = %record),
        }
    }
}
