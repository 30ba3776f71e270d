//! Logging for the `delight` binary.
//!
//! Two layers with their own levels:
//! - a log file at `~/.config/delight/delight.log` (or platform equivalent),
//!   rotated at 10 MB, that records lifecycle events at INFO and above
//! - stderr, quiet by default (WARN) so stdout stays usable for JSON output
//!
//! `DEBUG_LOGGING=1` raises both layers to DEBUG for the delight crates.

use std::path::PathBuf;

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const LOG_FILE_MAX_BYTES: u64 = 10 * 1024 * 1024;
const DELIGHT_DEBUG: &str = "delight_core=debug,delight_overlay=debug,delight_cli=debug";

fn file_filter(debug_logging: bool) -> EnvFilter {
    if debug_logging {
        EnvFilter::new(format!("info,{DELIGHT_DEBUG}"))
    } else {
        EnvFilter::new("info")
    }
}

fn console_filter(debug_logging: bool) -> EnvFilter {
    if debug_logging {
        EnvFilter::new(format!("warn,{DELIGHT_DEBUG}"))
    } else {
        EnvFilter::new("warn")
    }
}

/// Open the rotating log file behind a non-blocking writer
fn open_log_file() -> Result<(NonBlocking, WorkerGuard, PathBuf), String> {
    let log_dir = dirs::config_dir()
        .ok_or("no configuration directory")?
        .join("delight");
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| format!("cannot create {}: {e}", log_dir.display()))?;

    // Keep delight.log and one rotated delight.log.1
    let log_path = log_dir.join("delight.log");
    let appender = BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(LOG_FILE_MAX_BYTES),
        1,
    )
    .map_err(|e| format!("cannot open {}: {e}", log_path.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    Ok((writer, guard, log_path))
}

/// Initialize logging.
///
/// Returns the file writer's `WorkerGuard`, which must live until exit so
/// buffered lines are flushed. `None` means only stderr is logging.
pub fn init() -> Option<WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let (file_layer, guard, log_path) = match open_log_file() {
        Ok((writer, guard, path)) => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_span_events(FmtSpan::NONE)
                .with_filter(file_filter(debug_logging));
            (Some(layer), Some(guard), Some(path))
        }
        Err(e) => {
            // Subscriber not initialized yet
            eprintln!("File logging disabled: {e}");
            (None, None, None)
        }
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(console_filter(debug_logging));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::debug!(log_file = ?log_path, debug_logging, "Logging initialized");
    guard
}
