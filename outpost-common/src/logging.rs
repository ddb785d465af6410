use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the global tracing subscriber.
///
/// The level defaults to `TRACE` in debug builds and `INFO` otherwise,
/// and can be overridden through the `LOG_LEVEL` environment variable
/// (either a bare level or a full filter directive).
pub fn init() {
    let default = if cfg!(debug_assertions) {
        "trace"
    } else {
        "info"
    };

    let filter = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|spec| EnvFilter::try_new(&spec).ok())
        .unwrap_or_else(|| EnvFilter::new(format!("outpost={default}")));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_ansi(true),
        )
        .with(filter)
        .init();
}
