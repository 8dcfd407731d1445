//! Logging configuration for drift-guard.
//!
//! [`LogConfig`] is handed to the components that emit high-volume logs
//! (the validator's per-column results, the CSV loader's data operations)
//! so callers decide how chatty a run is. [`setup`] installs a
//! `tracing-subscriber` for applications that do not bring their own.

use tracing::Level;

/// Logging configuration for a validation run.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for drift-guard components
    pub base_level: Level,
    /// Whether to log every column's drift result
    pub log_column_details: bool,
    /// Whether to log data source operations
    pub log_data_operations: bool,
    /// Maximum length for logged field values
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_column_details: false,
            log_data_operations: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Creates a verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_column_details: true,
            log_data_operations: true,
            max_field_length: 1024,
        }
    }

    /// Creates a minimal configuration for production.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_column_details: false,
            log_data_operations: false,
            max_field_length: 128,
        }
    }

    pub fn balanced() -> Self {
        Self::default()
    }

    /// Whether `base_level` admits debug events. `tracing` orders more
    /// verbose levels as greater.
    pub fn debug_enabled(&self) -> bool {
        self.base_level >= Level::DEBUG
    }
}

/// Debug logging that is skipped entirely below the configured level.
#[macro_export]
macro_rules! perf_debug {
    ($config:expr, $($arg:tt)*) => {
        if $config.debug_enabled() {
            tracing::debug!($($arg)*);
        }
    };
}

/// Per-column logging, emitted only when column details are enabled.
#[macro_export]
macro_rules! log_column {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_column_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Data operation logging, emitted only when data operations are enabled.
#[macro_export]
macro_rules! log_data_op {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_data_operations {
            tracing::info!($($arg)*);
        }
    };
}

/// Truncates a string to `max_length` bytes, respecting char boundaries.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Subscriber setup for applications embedding drift-guard.
pub mod setup {
    use tracing::Level;

    /// Configuration for the global subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for the application
        pub level: Level,
        /// Log level for drift-guard components specifically
        pub drift_guard_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                drift_guard_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// JSON output, warnings from dependencies and info from drift-guard.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                drift_guard_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                drift_guard_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn with_drift_guard_level(mut self, level: Level) -> Self {
            self.drift_guard_level = level;
            self
        }

        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter directive string.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                filter.clone()
            } else {
                format!(
                    "{},drift_guard={}",
                    self.level.as_str().to_lowercase(),
                    self.drift_guard_level.as_str().to_lowercase()
                )
            }
        }
    }

    /// Installs a global `fmt` subscriber. `RUST_LOG` takes precedence over
    /// the configured filter.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use drift_guard::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(config.env_filter()))?;

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::setup::LoggingConfig;
    use super::*;

    #[test]
    fn test_log_config_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.base_level, Level::INFO);
        assert!(!config.log_column_details);
        assert!(config.log_data_operations);
        assert_eq!(config.max_field_length, 256);
    }

    #[test]
    fn test_log_config_presets() {
        assert!(LogConfig::verbose().log_column_details);
        let production = LogConfig::production();
        assert_eq!(production.base_level, Level::WARN);
        assert!(!production.log_data_operations);
    }

    #[test]
    fn test_debug_enabled_follows_base_level() {
        assert!(LogConfig::verbose().debug_enabled());
        assert!(!LogConfig::default().debug_enabled());
        assert!(!LogConfig::production().debug_enabled());

        let trace = LogConfig {
            base_level: Level::TRACE,
            ..LogConfig::default()
        };
        assert!(trace.debug_enabled());
    }

    #[test]
    fn test_truncate_field() {
        assert_eq!(truncate_field("hello", 10), "hello");
        assert_eq!(
            truncate_field("this is a very long text", 10),
            "this is a ...(truncated)"
        );
        // 'é' is two bytes; cutting inside it backs off to the boundary.
        assert_eq!(truncate_field("café", 4), "caf...(truncated)");
    }

    #[test]
    fn test_env_filter_directives() {
        assert_eq!(LoggingConfig::default().env_filter(), "info,drift_guard=debug");
        assert_eq!(
            LoggingConfig::production().env_filter(),
            "warn,drift_guard=info"
        );
        assert_eq!(
            LoggingConfig::default().with_env_filter("trace").env_filter(),
            "trace"
        );
    }
}
