use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "oslink=info";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default filter; `OSLINK_LOG_FORMAT=json` switches
/// to one JSON object per line for log shippers.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if json_requested() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}

fn json_requested() -> bool {
    std::env::var("OSLINK_LOG_FORMAT").is_ok_and(|format| format.trim().eq_ignore_ascii_case("json"))
}
