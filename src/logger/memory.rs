//! In-memory logger.

use parking_lot::Mutex;

use super::{Fields, Level, Logger};

/// Keeps every record in memory instead of writing it anywhere.
///
/// Records are stored as passed in, without `level`/`time` stamping, which
/// makes them easy to assert on. Unserializable records still panic, as with
/// every other logger.
///
/// ```rust
/// use weft::{Fields, Level, Logger, MemoryLogger};
///
/// let logger = MemoryLogger::new();
/// logger.error(Fields::new().with("type", "error"));
///
/// let records = logger.records();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].0, Level::Error);
/// ```
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<(Level, Fields)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything logged so far, oldest first.
    pub fn records(&self) -> Vec<(Level, Fields)> {
        self.records.lock().clone()
    }

    /// Records at `level` only.
    pub fn records_at(&self, level: Level) -> Vec<Fields> {
        self.records.lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, f)| f.clone())
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: Level, fields: Fields) {
        let fields = fields.validate();
        self.records.lock().push((level, fields));
    }
}
