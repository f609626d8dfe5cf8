//! Logging init: structured events on stderr, filtered by verbosity.

use tracing_subscriber::EnvFilter;

/// Default filter for the given verbosity flags.
fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "info"
    } else {
        "warn"
    }
}

/// Initializes logging to stderr. `RUST_LOG` overrides the flags.
///
/// Calling this twice is harmless; the second subscriber is ignored.
pub fn init_logging(verbose: bool, quiet: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false, false), "warn");
        assert_eq!(default_directive(true, false), "info");
        assert_eq!(default_directive(false, true), "error");
    }
}
