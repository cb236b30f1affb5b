//! Logging infrastructure - structured tracing throughout the heap
//!
//! Design: Uses `tracing` for structured, contextual logging with:
//! - Configurable log levels (env filter or explicit config)
//! - Zero-cost when disabled
//! - Console or rolling file output, human-readable or JSON

use once_cell::sync::OnceCell;
use std::io;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::allocator::SlotId;

// Re-export tracing macros for use throughout the crate
pub use tracing::{debug, error, info, trace, warn, Level};

/// Global logging state
static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line format
    Pretty,
    /// Single-line format
    Compact,
    /// JSON lines for structured ingestion
    Json,
}

/// Log output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    /// Daily-rotated file
    File { directory: String, prefix: String },
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default log level
    pub level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Show span events (enter/exit)
    pub show_spans: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            show_spans: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // SCOPEGC_LOG_LEVEL: trace, debug, info, warn, error
        if let Ok(level_str) = std::env::var("SCOPEGC_LOG_LEVEL") {
            config.level = parse_level(&level_str).unwrap_or(Level::INFO);
        }

        // SCOPEGC_LOG_FILE: path prefix of a daily-rotated log file
        if let Ok(path) = std::env::var("SCOPEGC_LOG_FILE") {
            let path = std::path::Path::new(&path);
            let directory = path
                .parent()
                .map(|p| p.to_string_lossy().into_owned())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| ".".to_string());
            let prefix = path
                .file_name()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_else(|| "scopegc.log".to_string());
            config.output = LogOutput::File { directory, prefix };
        }

        if std::env::var("SCOPEGC_LOG_JSON").is_ok() {
            config.format = LogFormat::Json;
        }

        config.show_spans = std::env::var("SCOPEGC_LOG_SPANS").is_ok();

        config
    }

    /// Verbose config for debugging collection behaviour
    pub fn debug() -> Self {
        Self {
            level: Level::TRACE,
            format: LogFormat::Pretty,
            output: LogOutput::Stderr,
            show_spans: true,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }
}

fn parse_level(value: &str) -> Option<Level> {
    match value.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Initialize logging with configuration taken from the environment
pub fn init() {
    init_with_config(LogConfig::from_env());
}

/// Initialize logging with custom configuration
///
/// Only the first call installs a subscriber; later calls are ignored.
pub fn init_with_config(config: LogConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("scopegc={}", config.level.as_str().to_lowercase()))
        });

        let span_events = if config.show_spans {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let writer = match &config.output {
            LogOutput::Stdout => BoxMakeWriter::new(io::stdout),
            LogOutput::Stderr => BoxMakeWriter::new(io::stderr),
            LogOutput::File { directory, prefix } => {
                BoxMakeWriter::new(tracing_appender::rolling::daily(directory, prefix))
            }
        };

        let base = fmt::layer()
            .with_writer(writer)
            .with_span_events(span_events)
            .with_target(true)
            .with_line_number(cfg!(debug_assertions));

        let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
            LogFormat::Pretty => base.pretty().boxed(),
            LogFormat::Compact => base.compact().boxed(),
            LogFormat::Json => base.json().boxed(),
        };

        tracing_subscriber::registry()
            .with(layer.with_filter(env_filter))
            .try_init()
            .ok(); // Ignore error if the embedder already installed a subscriber
    });
}

/// Check if logging is initialized
pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}

// ============================================================================
// Heap-specific logging functions
// ============================================================================

/// Log slot allocation
#[inline]
pub fn log_allocation(size: usize, slot: SlotId) {
    trace!(
        event = "allocation",
        size_bytes = size,
        slot = %slot,
        "Slot allocated"
    );
}

/// Log slot release
#[inline]
pub fn log_deallocation(size: usize, slot: SlotId) {
    trace!(
        event = "deallocation",
        size_bytes = size,
        slot = %slot,
        "Slot released"
    );
}

/// Log GC cycle start
pub fn log_gc_start(registered: usize, roots: usize) {
    debug!(
        event = "gc_start",
        registered,
        roots,
        "Starting garbage collection cycle"
    );
}

/// Log GC mark phase
pub fn log_gc_mark(marked: usize) {
    debug!(
        event = "gc_mark",
        objects_marked = marked,
        "GC mark phase complete"
    );
}

/// Log GC sweep phase
pub fn log_gc_sweep(swept: usize, bytes_reclaimed: usize, finalized: usize) {
    debug!(
        event = "gc_sweep",
        objects_swept = swept,
        bytes_reclaimed,
        finalized,
        "GC sweep phase complete"
    );
}

/// Log GC cycle completion
pub fn log_gc_complete(duration_us: u64, collected: usize, live: usize) {
    info!(
        event = "gc_complete",
        objects_collected = collected,
        live_objects = live,
        duration_us,
        "Garbage collection cycle complete"
    );
}

/// Log a threshold recomputation
pub fn log_threshold_adjusted(previous: usize, current: usize, elapsed_ms: u128) {
    debug!(
        event = "gc_threshold",
        previous,
        current,
        elapsed_ms,
        "Collection threshold adjusted"
    );
}

/// Log heap teardown
pub fn log_heap_teardown(destroyed: usize) {
    info!(
        event = "heap_teardown",
        objects_destroyed = destroyed,
        "Heap torn down"
    );
}

/// Performance tracking utilities
pub mod perf {
    use std::time::Instant;
    use tracing::debug;

    /// Track operation duration (returns guard that logs on drop)
    #[must_use]
    pub fn track(operation: &'static str) -> PerformanceGuard {
        PerformanceGuard {
            operation,
            start: Instant::now(),
        }
    }

    pub struct PerformanceGuard {
        operation: &'static str,
        start: Instant,
    }

    impl Drop for PerformanceGuard {
        fn drop(&mut self) {
            let elapsed = self.start.elapsed();
            debug!(
                operation = self.operation,
                duration_us = elapsed.as_micros() as u64,
                "operation completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = LogConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert_eq!(config.output, LogOutput::Stderr);

        let debug_config = LogConfig::debug();
        assert_eq!(debug_config.level, Level::TRACE);
        assert!(debug_config.show_spans);
    }

    #[test]
    fn test_builder_overrides() {
        let config = LogConfig::default()
            .with_level(Level::WARN)
            .with_format(LogFormat::Json)
            .with_output(LogOutput::Stdout);

        assert_eq!(config.level, Level::WARN);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.output, LogOutput::Stdout);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Some(Level::DEBUG));
        assert_eq!(parse_level("warn"), Some(Level::WARN));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_init_idempotent() {
        init_with_config(LogConfig::default().with_level(Level::ERROR));
        init();
        assert!(is_initialized());
    }

    #[test]
    fn test_logging_functions() {
        // These should not panic
        log_allocation(64, SlotId::new(0, 1));
        log_deallocation(64, SlotId::new(0, 1));
        log_gc_start(10, 2);
        log_gc_mark(4);
        log_gc_sweep(6, 384, 1);
        log_gc_complete(120, 6, 4);
        log_threshold_adjusted(4048, 6072, 12);
        log_heap_teardown(4);
        drop(perf::track("noop"));
    }
}
