//! Logging and tracing configuration

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "detox_config=info,warn";

/// Initialize tracing for the CLI (stderr logging)
///
/// Logs are controlled by the `RUST_LOG` environment variable. `verbose`
/// raises this crate to DEBUG when `RUST_LOG` is unset. Stdout is left to
/// the composed configuration output.
pub fn init_cli(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("detox_config=debug,detox_artifacts=debug,warn")
        } else {
            EnvFilter::new(DEFAULT_FILTER)
        }
    });

    // try_init: tests and embedding callers may have installed a subscriber already
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}
