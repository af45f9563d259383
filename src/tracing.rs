//! Logging setup for the `scopeline` binary
//!
//! Two sinks share one registry:
//! - stderr, filtered by `RUST_LOG` (default `warn`) so stdout carries only
//!   token output; `RUST_LOG=scopeline::syntax=trace` shows every parse
//! - `<config dir>/logs/scopeline.log.<date>`, scopeline's own events at
//!   `debug`, rotated daily

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "scopeline.log";
const FILE_DIRECTIVES: &str = "scopeline=debug";

pub fn init() {
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(stderr_filter);

    // Without a writable log directory the binary still runs, console only
    let file_layer = crate::config_paths::ensure_logs_dir()
        .inspect_err(|e| eprintln!("scopeline: file logging disabled: {}", e))
        .ok()
        .map(|dir| {
            fmt::layer()
                .with_writer(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX))
                .with_ansi(false)
                .with_line_number(true)
                .with_filter(EnvFilter::new(FILE_DIRECTIVES))
        });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
}
