//! # Logging
//!
//! Installs a `tracing-subscriber` registry for the catalog crates: an
//! `EnvFilter`, one formatted output layer and, when the host supplies a
//! [`LoggerSink`], a layer mirroring every event that passes the filter to
//! that sink.
//!
//! ```ignore
//! use bridge_traits::time::{ConsoleLogger, LogLevel};
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//! use std::sync::Arc;
//!
//! init_logging(
//!     LoggingConfig::default()
//!         .format(LogFormat::Compact)
//!         .level(LogLevel::Debug)
//!         .sink(Arc::new(ConsoleLogger::new(LogLevel::Warn))),
//! )?;
//! tracing::info!("Catalog started");
//! ```
//!
//! On wasm32 [`init_logging`] does nothing.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bridge_traits::time::{LogLevel, LoggerSink};

use crate::error::{Error, Result};

#[cfg(not(target_arch = "wasm32"))]
pub use native::init_logging;

/// Crates following the configured level. Everything else logs at `warn`.
const CATALOG_CRATES: &[&str] = &[
    "core_runtime",
    "core_library",
    "core_service",
    "bridge_traits",
    "bridge_desktop",
];

/// Output layout of the formatted layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, colored; for local development
    Pretty,
    /// One JSON object per event
    Json,
    /// One line per event
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(Error::Config(format!(
                "Unknown log format '{}' (expected pretty, json or compact)",
                other
            ))),
        }
    }
}

/// What [`init_logging`] installs
#[derive(Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Level for the catalog crates when no custom filter is set
    pub level: LogLevel,
    /// `EnvFilter` directives replacing the defaults, e.g. `core_library=trace`
    pub filter: Option<String>,
    pub sink: Option<Arc<dyn LoggerSink>>,
    /// Log span enter/exit (pretty, compact) or the span list (json)
    pub span_events: bool,
    pub show_target: bool,
    pub show_threads: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            sink: None,
            span_events: true,
            show_target: true,
            show_threads: false,
        }
    }
}

impl fmt::Debug for LoggingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingConfig")
            .field("format", &self.format)
            .field("level", &self.level)
            .field("filter", &self.filter)
            .field("sink", &self.sink.is_some())
            .field("span_events", &self.span_events)
            .field("show_target", &self.show_target)
            .field("show_threads", &self.show_threads)
            .finish()
    }
}

impl LoggingConfig {
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn filter(mut self, directives: impl Into<String>) -> Self {
        self.filter = Some(directives.into());
        self
    }

    pub fn sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    pub fn show_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    pub fn show_threads(mut self, show: bool) -> Self {
        self.show_threads = show;
        self
    }

    /// Directives the filter is built from
    pub fn directives(&self) -> String {
        self.filter
            .clone()
            .unwrap_or_else(|| default_filter_directives(self.level))
    }
}

/// `warn` globally, `level` for each catalog crate.
pub fn default_filter_directives(level: LogLevel) -> String {
    std::iter::once("warn".to_string())
        .chain(
            CATALOG_CRATES
                .iter()
                .map(|krate| format!("{}={}", krate, level)),
        )
        .collect::<Vec<_>>()
        .join(",")
}

/// Cut free-form text to `max_chars` characters for a log field, marking the
/// cut with `…`.
///
/// ```
/// use core_runtime::logging::truncate_for_log;
///
/// assert_eq!(truncate_for_log("The Left Hand of Darkness", 8), "The Left…");
/// ```
pub fn truncate_for_log(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &value[..cut]),
        None => value.to_string(),
    }
}

#[cfg(target_arch = "wasm32")]
pub fn init_logging(_config: LoggingConfig) -> Result<()> {
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::collections::BTreeMap;
    use std::fmt;
    use std::io;
    use std::sync::Arc;

    use bridge_traits::time::{LogEntry, LogLevel, LoggerSink};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::registry::LookupSpan;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::Layer;

    use super::{LogFormat, LoggingConfig};
    use crate::error::{Error, Result};

    /// Install the global subscriber described by `config`.
    ///
    /// # Errors
    /// - `Error::Config` when the filter directives do not parse
    /// - `Error::LoggingInstalled` when a global subscriber already exists
    pub fn init_logging(config: LoggingConfig) -> Result<()> {
        let filter = build_filter(&config)?;

        tracing_subscriber::registry()
            .with(filter)
            .with(SinkForwarder::new(config.sink.clone()))
            .with(output_layer(&config))
            .try_init()
            .map_err(|e| Error::LoggingInstalled(e.to_string()))
    }

    pub(super) fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
        EnvFilter::try_new(config.directives())
            .map_err(|e| Error::Config(format!("Invalid log filter: {}", e)))
    }

    fn output_layer<S>(config: &LoggingConfig) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let spans = if config.span_events {
            FmtSpan::ACTIVE
        } else {
            FmtSpan::NONE
        };
        let layer = tracing_subscriber::fmt::layer()
            .with_target(config.show_target)
            .with_thread_ids(config.show_threads)
            .with_thread_names(config.show_threads)
            .with_writer(io::stdout);

        match config.format {
            LogFormat::Pretty => layer.pretty().with_span_events(spans).boxed(),
            LogFormat::Compact => layer.compact().with_span_events(spans).boxed(),
            LogFormat::Json => layer
                .json()
                .flatten_event(true)
                .with_current_span(config.span_events)
                .with_span_list(config.span_events)
                .boxed(),
        }
    }

    /// Mirrors filtered events to the host's [`LoggerSink`].
    pub(super) struct SinkForwarder {
        sink: Option<Arc<dyn LoggerSink>>,
    }

    impl SinkForwarder {
        pub(super) fn new(sink: Option<Arc<dyn LoggerSink>>) -> Self {
            Self { sink }
        }
    }

    impl<S> Layer<S> for SinkForwarder
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
            let Some(sink) = &self.sink else {
                return;
            };
            let metadata = event.metadata();
            let level = log_level(metadata.level());
            if !sink.accepts(level) {
                return;
            }

            let mut fields = FieldCollector::default();
            event.record(&mut fields);

            let mut entry = LogEntry::new(
                level,
                metadata.target(),
                fields.message.unwrap_or_else(|| metadata.name().to_string()),
            );
            entry.fields = fields.values;
            entry.span = ctx.lookup_current().map(|span| span.name().to_string());

            // Blocking keeps sink order equal to emission order.
            if let Err(err) = futures::executor::block_on(sink.log(entry)) {
                eprintln!("Log sink rejected an event: {}", err);
            }
        }
    }

    #[derive(Default)]
    struct FieldCollector {
        message: Option<String>,
        values: BTreeMap<String, String>,
    }

    impl FieldCollector {
        fn put(&mut self, field: &Field, value: String) {
            match field.name() {
                "message" => self.message = Some(value),
                name => {
                    self.values.insert(name.to_string(), value);
                }
            }
        }
    }

    // Numbers and bools arrive through `record_debug`, which prints them bare.
    impl Visit for FieldCollector {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.put(field, value.to_string());
        }

        fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
            self.put(field, value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.put(field, format!("{:?}", value));
        }
    }

    fn log_level(level: &Level) -> LogLevel {
        match *level {
            Level::ERROR => LogLevel::Error,
            Level::WARN => LogLevel::Warn,
            Level::INFO => LogLevel::Info,
            Level::DEBUG => LogLevel::Debug,
            Level::TRACE => LogLevel::Trace,
        }
    }
}
