//! Logger configuration for the default chain.
//!
//! There is no global logger: whoever builds a pipeline passes a [`Config`]
//! (or individual loggers) explicitly.
//!
//! | Variable | Values | Default |
//! |---|---|---|
//! | `WEFT_LOG_FORMAT` | `json`, `template`, `tracing` | `json` |
//! | `WEFT_LOG_TEMPLATE` | any `{{field}}` template | [`DEFAULT_TEMPLATE`](crate::logger::DEFAULT_TEMPLATE) |

use std::sync::Arc;

use crate::error::ConfigError;
use crate::logger::{DEFAULT_TEMPLATE, JsonLogger, Logger, SharedLogger, TemplateLogger, TracingLogger};

const FORMAT_VAR: &str = "WEFT_LOG_FORMAT";
const TEMPLATE_VAR: &str = "WEFT_LOG_TEMPLATE";

/// Loggers used by [`default_chain`](crate::default_chain).
#[derive(Clone)]
pub struct Config {
    /// Receives one `request` record per request.
    pub request_logger: SharedLogger,
    /// Receives `recovery` and `error` records.
    pub error_logger: SharedLogger,
}

impl Config {
    /// Uses `logger` for both request and error records.
    pub fn new(logger: impl Logger + 'static) -> Self {
        Self::shared(Arc::new(logger))
    }

    fn shared(logger: SharedLogger) -> Self {
        Self { request_logger: Arc::clone(&logger), error_logger: logger }
    }

    /// Replaces both loggers with `logger`.
    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        let logger: SharedLogger = Arc::new(logger);
        self.request_logger = Arc::clone(&logger);
        self.error_logger = logger;
        self
    }

    pub fn with_request_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.request_logger = Arc::new(logger);
        self
    }

    pub fn with_error_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.error_logger = Arc::new(logger);
        self
    }

    /// Builds the configuration from `WEFT_LOG_*` environment variables.
    /// Every logger writes to stdout.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let format = lookup(FORMAT_VAR).unwrap_or_default();
        let logger: SharedLogger = match format.trim() {
            "" | "json" => Arc::new(JsonLogger::stdout()),
            "tracing" => Arc::new(TracingLogger::new()),
            "template" => {
                let template = lookup(TEMPLATE_VAR).unwrap_or_else(|| DEFAULT_TEMPLATE.to_owned());
                Arc::new(TemplateLogger::stdout(&template))
            }
            other => return Err(ConfigError { key: FORMAT_VAR, value: other.to_owned() }),
        };
        Ok(Self::shared(logger))
    }
}

impl Default for Config {
    /// JSON records on stdout.
    fn default() -> Self {
        Self::new(JsonLogger::stdout())
    }
}
