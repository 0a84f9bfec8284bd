//! Tracing setup for the portal binaries.
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies to the
//! portal crates and hyper's connection chatter is kept at `warn`.

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    EnvFilter { value: String, source: ParseError },
    #[error("telemetry error: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

fn default_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    let directives = format!("{level},hyper=warn");
    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::EnvFilter {
        value: directives,
        source,
    })
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => default_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_default_filter_accepts_plain_levels() {
        assert!(default_filter("info").is_ok());
        assert!(default_filter("placement_cell=debug").is_ok());
    }

    #[test]
    fn garbage_levels_are_reported_with_the_offending_value() {
        let err = default_filter("no-such=level=here").unwrap_err();
        match err {
            TelemetryError::EnvFilter { value, .. } => {
                assert!(value.contains("no-such=level=here"))
            }
            TelemetryError::Subscriber(_) => panic!("wrong variant"),
        }
    }
}
