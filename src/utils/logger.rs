//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production
//! environments. Production uses JSON output; development uses a compact
//! pretty format. An optional daily-rotated file sink can be attached.

use tracing_subscriber::EnvFilter;

/// Initialize the logger (console only).
pub fn init_logger(level: &str, json_format: bool) {
    init_logger_with_file(level, json_format, None);
}

/// Initialize the logger with optional file output.
///
/// `RUST_LOG` takes precedence over `level` when set. When `log_dir` is
/// given it is created if missing and a `shopfront.YYYY-MM-DD` file is
/// rotated daily inside it.
pub fn init_logger_with_file(level: &str, json_format: bool, log_dir: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json();

        if let Some(dir) = log_dir
            && std::fs::create_dir_all(dir).is_ok()
        {
            let file_appender = tracing_appender::rolling::daily(dir, "shopfront");
            builder.with_writer(file_appender).init();
        } else {
            builder.init();
        }
    } else {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_thread_ids(false);

        if let Some(dir) = log_dir
            && std::fs::create_dir_all(dir).is_ok()
        {
            let file_appender = tracing_appender::rolling::daily(dir, "shopfront");
            builder.with_writer(file_appender).init();
        } else {
            builder.init();
        }
    }
}
