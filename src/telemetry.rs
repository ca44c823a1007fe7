use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::Layer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Name of the diagnostic trace file written when a trace directory is given
pub const TRACE_FILE_NAME: &str = "scraper.trace.log";

// Keeps the non-blocking file writer flushing until the process exits
pub struct TelemetryGuard {
    _file_guard: Option<WorkerGuard>,
}

// Console layer on stderr filtered by RUST_LOG, plus an optional file layer
// that records everything from this crate at debug level.
pub fn init_tracing_subscriber(trace_dir: Option<&Path>) -> anyhow::Result<TelemetryGuard> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_default_env());

    let (file_layer, file_guard) = match trace_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::new(Rotation::NEVER, dir, TRACE_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shirt_scraper=debug,info"));
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter);

            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(TelemetryGuard {
        _file_guard: file_guard,
    })
}
