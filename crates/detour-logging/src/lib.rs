//! Structured logging for Detour
//!
//! Thin layer over `tracing-subscriber` and `tracing-appender` that gives
//! every Detour binary the same logging setup.
//!
//! # Features
//!
//! - **JSONL Output**: Structured JSON lines for batch runs and log aggregation (default)
//! - **Pretty Output**: Human-readable console output for interactive runs
//! - **Run Context**: Run id and seed for correlating lines from many runs
//! - **File Rotation**: Daily/hourly log rotation via tracing-appender
//!
//! Console output goes to stderr; stdout is reserved for run results.
//!
//! # Quick Start
//!
//! ```ignore
//! use detour_logging::{DetourSubscriberBuilder, LogConfig, RunContextGuard, run_span};
//!
//! // Simple setup with defaults (JSONL to console)
//! let _guard = DetourSubscriberBuilder::new().init();
//!
//! // Development mode with pretty human-readable output
//! let _guard = DetourSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .init();
//!
//! // Tag everything logged during a run with its id and seed
//! let _run = RunContextGuard::new(seed);
//! let _enter = run_span().entered();
//! ```

pub mod config;
pub mod context;

pub use config::{ConsoleConfig, FileConfig, JsonlConfig, LogConfig, RotationStrategy};
pub use context::{RunContextData, RunContextGuard, run_span};

use std::fs::{self, File};
use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{
    self, MakeWriter,
    format::{DefaultFields, Format, Full, Json, JsonFields},
};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors raised while installing the global subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create rolling log appender: {0}")]
    Rolling(#[from] tracing_appender::rolling::InitError),

    #[error("Failed to install subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Builder for configuring and initializing the Detour logging subscriber
///
/// By default, console output uses JSONL format. Use `LogConfig::cli()` or
/// `LogConfig::development()` for human-readable output.
pub struct DetourSubscriberBuilder {
    config: LogConfig,
}

impl DetourSubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    ///
    /// Default: JSONL output to console
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    /// Initialize the subscriber globally
    ///
    /// Returns a guard that must be kept alive for the duration of the program
    /// when file output is enabled. Failures are reported on stderr and leave
    /// the process without a subscriber.
    pub fn init(self) -> Option<WorkerGuard> {
        match self.try_init() {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Warning: Failed to initialize logging: {}", e);
                None
            }
        }
    }

    /// Try to initialize the subscriber globally
    ///
    /// Returns an error if the log file cannot be opened or a global
    /// subscriber has already been set.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.config.default_level));

        let (file_writer, guard) = match &self.config.file {
            Some(file_config) => {
                let (writer, guard) = create_file_writer(file_config)?;
                (Some(writer), Some(guard))
            }
            None => (None, None),
        };

        let registry = Registry::default().with(env_filter);
        let console = &self.config.console;
        let jsonl = &self.config.jsonl;

        // Separate arms for pretty vs JSONL console to satisfy the type system
        match (console.enabled, console.pretty, file_writer) {
            // Pretty console + File
            (true, true, Some(file)) => registry
                .with(pretty_layer(console.ansi, std::io::stderr))
                .with(jsonl_layer(jsonl, file))
                .try_init()?,

            // JSONL console + File
            (true, false, Some(file)) => registry
                .with(jsonl_layer(jsonl, std::io::stderr))
                .with(jsonl_layer(jsonl, file))
                .try_init()?,

            // Pretty console only
            (true, true, None) => registry
                .with(pretty_layer(console.ansi, std::io::stderr))
                .try_init()?,

            // JSONL console only (DEFAULT)
            (true, false, None) => registry
                .with(jsonl_layer(jsonl, std::io::stderr))
                .try_init()?,

            // File only (no console)
            (false, _, Some(file)) => registry.with(jsonl_layer(jsonl, file)).try_init()?,

            // Nothing enabled - just the filter
            (false, _, None) => registry.try_init()?,
        }

        Ok(guard)
    }
}

impl Default for DetourSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Open the configured log destination behind a non-blocking writer
fn create_file_writer(config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    let rotation = match config.rotation {
        RotationStrategy::Never => {
            // Create/truncate a single file
            fs::create_dir_all(&config.directory).map_err(|source| LoggingError::Io {
                path: config.directory.clone(),
                source,
            })?;
            let path = config.directory.join(format!("{}.log", config.prefix));
            let file = File::create(&path).map_err(|source| LoggingError::Io { path, source })?;
            return Ok(tracing_appender::non_blocking(file));
        }
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
    };

    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(&config.prefix)
        .filename_suffix("log")
        .build(&config.directory)?;
    Ok(tracing_appender::non_blocking(appender))
}

/// JSONL formatting layer shared by console and file output
fn jsonl_layer<S, W>(config: &JsonlConfig, writer: W) -> fmt::Layer<S, JsonFields, Format<Json>, W>
where
    W: for<'writer> MakeWriter<'writer> + 'static,
{
    fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(config.include_spans)
        .flatten_event(config.flatten_events)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_writer(writer)
}

/// Human-readable console layer
fn pretty_layer<S, W>(ansi: bool, writer: W) -> fmt::Layer<S, DefaultFields, Format<Full>, W>
where
    W: for<'writer> MakeWriter<'writer> + 'static,
{
    fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_creation() {
        let builder = DetourSubscriberBuilder::new();
        assert_eq!(builder.config.default_level, "info");
    }

    #[test]
    fn test_default_is_jsonl() {
        let builder = DetourSubscriberBuilder::new();
        assert!(!builder.config.console.pretty); // JSONL by default
    }

    #[test]
    fn test_builder_with_config() {
        let config = LogConfig::development();
        let builder = DetourSubscriberBuilder::new().with_config(config);
        assert_eq!(builder.config.default_level, "debug");
        assert!(builder.config.console.pretty);
    }

    #[test]
    fn test_builder_with_level() {
        let builder = DetourSubscriberBuilder::new().with_level("trace");
        assert_eq!(builder.config.default_level, "trace");
    }

    #[test]
    fn test_builder_with_file_output() {
        let builder = DetourSubscriberBuilder::new()
            .with_config(LogConfig::cli())
            .with_file_output(FileConfig {
                directory: PathBuf::from("/tmp/detour-logs"),
                ..Default::default()
            });
        let file = builder.config.file.unwrap();
        assert_eq!(file.directory, PathBuf::from("/tmp/detour-logs"));
        assert_eq!(file.prefix, "detour");
        assert!(builder.config.console.pretty);
    }

    #[test]
    fn test_builder_with_console() {
        let builder = DetourSubscriberBuilder::new().with_console(false);
        assert!(!builder.config.console.enabled);
    }

    #[test]
    fn test_never_rotation_creates_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfig {
            directory: dir.path().join("logs"),
            prefix: "run".to_string(),
            rotation: RotationStrategy::Never,
        };

        let (_writer, _guard) = create_file_writer(&config).unwrap();
        assert!(dir.path().join("logs").join("run.log").exists());
    }
}
