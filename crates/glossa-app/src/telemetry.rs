use atty::Stream;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// `RUST_LOG` when set, `info` otherwise; `debug` raises the floor to debug
pub fn filter(debug: bool) -> EnvFilter {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if debug {
        filter.add_directive(LevelFilter::DEBUG.into())
    } else {
        filter
    }
}

/// Install the global subscriber. A subscriber the host already installed is kept.
pub fn init(debug: bool) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .with_ansi(atty::is(Stream::Stdout))
        .with_target(false)
        .try_init();

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
