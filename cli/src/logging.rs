//! Logging configuration with file-based output and size-based rotation.
//!
//! Writes logs to `~/.config/probate-dash/probate-dash.log` (or platform
//! equivalent) with 10 MB size-based rotation. The console only shows
//! warnings so the prompt stays readable; set `DEBUG_LOGGING=1` to see
//! everything, with debug output for the dashboard crates.

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan, writer::MakeWriterExt},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const APP_DIR: &str = "probate-dash";
const LOG_FILE: &str = "probate-dash.log";
const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

fn filter_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        "info,probate_core=debug,probate_cli=debug"
    } else {
        "info"
    }
}

fn console_level(debug_logging: bool) -> Level {
    if debug_logging { Level::TRACE } else { Level::WARN }
}

/// Initialize logging with dual output (file + stderr).
///
/// Returns a `WorkerGuard` that must be held for the application lifetime
/// so buffered lines are flushed on shutdown. Falls back to console-only
/// logging (and returns `None`) when the log file cannot be opened.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let log_dir = match dirs::config_dir() {
        Some(config) => config.join(APP_DIR),
        None => {
            init_console_only(debug_logging);
            return None;
        }
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // No subscriber yet
        eprintln!(
            "Failed to create log directory {:?}: {}, logging to console only",
            log_dir, e
        );
        init_console_only(debug_logging);
        return None;
    }

    // probate-dash.log plus one rotated probate-dash.log.1
    let log_path = log_dir.join(LOG_FILE);
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(MAX_LOG_BYTES),
        1,
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {:?}: {}", log_path, e);
            init_console_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr.with_max_level(console_level(debug_logging)))
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(EnvFilter::new(filter_directive(debug_logging)))
        .init();

    tracing::info!(log_file = ?log_path, debug_logging, "logging initialized");

    Some(guard)
}

fn init_console_only(debug_logging: bool) {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr.with_max_level(console_level(debug_logging)))
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(EnvFilter::new(filter_directive(debug_logging)))
        .init();

    tracing::info!(debug_logging, "logging initialized (console only)");
}
