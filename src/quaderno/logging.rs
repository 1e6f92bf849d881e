//! Tracing/logging initialization for the binary.
//!
//! Events go to stderr so they never mix with command output on stdout.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "warn";
pub const VERBOSE_FILTER: &str = "debug";

/// Filter to install: `--verbose` wins, then `RUST_LOG`, then warnings only.
pub fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new(VERBOSE_FILTER);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize tracing for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_filter() {
        assert_eq!(filter(true).to_string(), VERBOSE_FILTER);
    }

    #[test]
    fn test_rust_log_used_when_not_verbose() {
        std::env::set_var("RUST_LOG", "quaderno=info");
        let from_env = filter(false).to_string();
        let verbose = filter(true).to_string();
        std::env::remove_var("RUST_LOG");

        assert_eq!(from_env, "quaderno=info");
        assert_eq!(verbose, VERBOSE_FILTER);
    }
}
