//! Logging for usnscope
//!
//! Module-tagged helpers (`logging::debug("USN", ...)`) routed through
//! `tracing`. The library only emits events; binaries decide where they go by
//! calling [`init`].

use tracing_subscriber::EnvFilter;

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Map a `-v` count onto a level (0 = warn, 1 = info, 2+ = debug)
    pub fn from_verbosity(verbosity: u8) -> Self {
        match verbosity {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }

    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `min_level`. Calling this more than once
/// is harmless; only the first call installs anything.
pub fn init(min_level: LogLevel) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(min_level.as_filter()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log debug message
pub fn debug(module: &str, message: &str) {
    tracing::debug!(module = module, "{}", message);
}

/// Log info message
pub fn info(module: &str, message: &str) {
    tracing::info!(module = module, "{}", message);
}

/// Log warning message
pub fn warn(module: &str, message: &str) {
    tracing::warn!(module = module, "{}", message);
}

/// Log error message
pub fn error(module: &str, message: &str) {
    tracing::error!(module = module, "{}", message);
}

// ============================================================================
// Specialized logging functions for the timeline pipeline
// ============================================================================

/// Log a record the reader could not decode
pub fn log_corrupted_record(index: u64, offset: usize, detail: &str) {
    let msg = format!("Corrupted record #{} at offset {}: {}", index, offset, detail);
    debug("USN", &msg);
}

/// Log a padding run the reader skipped over
pub fn log_padding_skip(from: usize, to: usize) {
    let msg = format!("Skipped zero padding 0x{:X}..0x{:X}", from, to);
    debug("USN", &msg);
}

/// Log an event the correlator had to drop
pub fn log_lookup_failure(file_id: u64, parent_file_id: u64, name: &str) {
    let msg = format!(
        "File {} not found (file_id={}, parent_file_id={})",
        name, file_id, parent_file_id
    );
    debug("TIMELINE", &msg);
}

/// Write a separator line for readability
pub fn separator(label: &str) {
    let msg = format!("========== {} ==========", label);
    info("---", &msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(LogLevel::from_verbosity(0), LogLevel::Warn);
        assert_eq!(LogLevel::from_verbosity(1), LogLevel::Info);
        assert_eq!(LogLevel::from_verbosity(7), LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Error);
    }

    #[test]
    fn helpers_do_not_require_a_subscriber() {
        debug("TEST", "no subscriber installed");
        separator("TEST");
    }
}
