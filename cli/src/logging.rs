//! Tracing initialisation.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Call once, before anything logs.
///
/// `RUST_LOG` wins over `debug` when set.
pub fn init_tracing(debug: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(debug)));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

fn default_directives(debug: bool) -> String {
    if debug {
        // HTTP internals are noisy at debug.
        "debug,hyper=info,hyper_util=info,reqwest=info,rustls=info".into()
    } else {
        "info".into()
    }
}
