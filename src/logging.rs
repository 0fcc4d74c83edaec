//! tracing subscriber setup for the binary.

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable read before `RUST_LOG`.
pub const LOG_ENV: &str = "PV_STATION_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Builds the log filter from a directive, falling back to `info` when it
/// is absent or malformed.
pub fn filter_from(directive: Option<&str>) -> EnvFilter {
    match directive {
        Some(d) => EnvFilter::try_new(d).unwrap_or_else(|err| {
            eprintln!("invalid {LOG_ENV} directive ({err}); defaulting to {DEFAULT_DIRECTIVE}");
            EnvFilter::new(DEFAULT_DIRECTIVE)
        }),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE)),
    }
}

/// Installs a human-readable subscriber writing to stderr.
///
/// `PV_STATION_LOG` takes precedence over `RUST_LOG`; with neither set the
/// level is `info`. Stdout stays free for tables and JSON output. Calling
/// this twice is harmless: the second install is ignored.
pub fn init() {
    let directive = std::env::var(LOG_ENV).ok();
    let filter = filter_from(directive.as_deref());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
