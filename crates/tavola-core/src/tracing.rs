use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset: info everywhere, debug for the
/// server crate itself.
const DEFAULT_FILTER: &str = "info,tavola_server=debug";

/// Initialize structured stdout tracing for the Tavola server. Call once at
/// startup. JSON output; filter from `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`].
///
/// Safe to call multiple times — subsequent calls are silently ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json())
        .try_init();
}
