//! Logging module
//!
//! Module-tagged logging to stderr with local timestamps.
//! Use the `log_error!`, `log_warn!`, `log_info!` and `log_debug!` macros,
//! passing the module name as the first argument.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

/// Debug output is off until developer mode asks for it
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }
}

/// Initialize the logging system with INFO (default) or DEBUG output
pub fn init(debug: bool) {
    DEBUG_ENABLED.store(debug, Ordering::SeqCst);
    if debug {
        log(Level::Info, "logging", "Log level set to DEBUG");
    }
}

/// Whether a record at `level` would be written
pub fn enabled(level: Level) -> bool {
    level != Level::Debug || DEBUG_ENABLED.load(Ordering::SeqCst)
}

/// Format a single log line
fn format_line(level: Level, module: &str, message: &str) -> String {
    format!(
        "{} {:<5} [{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        level.as_str(),
        module,
        message
    )
}

/// Write a record. Prefer the macros over calling this directly.
pub fn log(level: Level, module: &str, message: &str) {
    if !enabled(level) {
        return;
    }
    let line = format_line(level, module, message);
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{}", line);
}

#[macro_export]
macro_rules! log_error {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::log($crate::logging::Level::Error, $module, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::log($crate::logging::Level::Warn, $module, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::log($crate::logging::Level::Info, $module, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($module:expr, $($arg:tt)*) => {
        if $crate::logging::enabled($crate::logging::Level::Debug) {
            $crate::logging::log($crate::logging::Level::Debug, $module, &format!($($arg)*))
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line_contains_level_and_module() {
        let line = format_line(Level::Warn, "search", "slow response");
        assert!(line.contains("WARN"));
        assert!(line.contains("[search]"));
        assert!(line.ends_with("slow response"));
    }

    #[test]
    fn test_init_controls_debug_output() {
        init(true);
        assert!(enabled(Level::Debug));
        init(false);
        assert!(!enabled(Level::Debug));
        assert!(enabled(Level::Info));
    }

    #[test]
    fn test_error_and_info_always_enabled() {
        assert!(enabled(Level::Error));
        assert!(enabled(Level::Warn));
        assert!(enabled(Level::Info));
    }
}
