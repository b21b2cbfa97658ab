//! Rotating log system
//!
//! Logs to both console and rotating files in the log directory.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system with rotating file logs
pub fn init_logging(log_dir: &str) {
    // Create the log directory on first run
    let log_path = Path::new(log_dir);
    if !log_path.exists() {
        if let Err(e) = std::fs::create_dir_all(log_path) {
            eprintln!("Failed to create log directory {}: {}", log_dir, e);
        }
    }

    // Rotates daily: dragon_walker.log.YYYY-MM-DD
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "dragon_walker.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Logging lasts as long as the process
    std::mem::forget(guard);

    // Default to INFO, overridable with RUST_LOG
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dragon_walker=debug"));

    // Console layer on stderr so `points` can stream JSON on stdout
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    // File layer - plain text, no ANSI colors, thread ids for the GUI/tokio split
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!("Logging initialized. Log directory: {}", log_dir);
}

/// Log an error with context
#[macro_export]
macro_rules! log_error {
    ($msg:expr) => {
        tracing::error!(error = %$msg, "Error occurred");
    };
    ($msg:expr, $($field:tt)*) => {
        tracing::error!(error = %$msg, $($field)*, "Error occurred");
    };
}
