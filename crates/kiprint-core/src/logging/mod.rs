use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with optional verbose mode.
///
/// Logs are structured JSON on stderr so stdout stays reserved for the
/// produced output path. When `verbose` is true, debug-level events are
/// emitted (every poll retry and keystroke); otherwise info-level and above.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    let mut filter = EnvFilter::from_default_env();
    for target in ["kiprint", "kiprint_core"] {
        filter = filter.add_directive(
            format!("{target}={level}")
                .parse()
                .expect("Invalid log directive"),
        );
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_init_logging() {
        // Can only install a global subscriber once per process, so the
        // function is exercised via the CLI integration tests instead.
    }
}
