//! Logging setup
//!
//! Diagnostics go to stderr through `tracing`; stdout carries only the
//! generated answer.

use crate::cli::Verbosity;
use crate::errors::{Result, SayError};
use tracing_subscriber::EnvFilter;

/// Filter used when RUST_LOG is unset
pub fn default_filter(verbosity: Verbosity) -> String {
    format!("{},hyper=warn,reqwest=warn", verbosity.log_level())
}

/// Install the global stderr subscriber
///
/// RUST_LOG takes precedence over the verbosity flags.
pub fn init(verbosity: Verbosity) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| SayError::Config(format!("Failed to initialise logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_follows_verbosity() {
        assert_eq!(default_filter(Verbosity::Normal), "warn,hyper=warn,reqwest=warn");
        assert!(default_filter(Verbosity::VeryVerbose).starts_with("debug,"));
    }

    #[test]
    fn test_default_filter_parses() {
        for verbosity in [
            Verbosity::Quiet,
            Verbosity::Normal,
            Verbosity::Verbose,
            Verbosity::VeryVerbose,
        ] {
            assert!(EnvFilter::try_new(default_filter(verbosity)).is_ok());
        }
    }
}
