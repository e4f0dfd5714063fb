use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter(verbose: bool, level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| match (verbose, level) {
        (true, _) => EnvFilter::new("hotel_directory=debug,info"),
        (false, Some(level)) => EnvFilter::new(format!("hotel_directory={}", level)),
        (false, None) => EnvFilter::new("hotel_directory=info"),
    })
}

pub fn init_cli_logger(verbose: bool) {
    init_cli_logger_with_level(verbose, None);
}

/// Like [`init_cli_logger`], with an optional crate log level taken from
/// configuration. `RUST_LOG` still wins when set.
pub fn init_cli_logger_with_level(verbose: bool, level: Option<&str>) {
    tracing_subscriber::registry()
        .with(default_filter(verbose, level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

pub fn init_json_logger() {
    tracing_subscriber::registry()
        .with(default_filter(false, None))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}
