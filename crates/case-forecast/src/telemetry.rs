use std::io;

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

/// Stream receiving formatted events.
///
/// The CLI prints its results as JSON on stdout, so its logs go to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogSink {
    #[default]
    Stdout,
    Stderr,
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("telemetry error: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Install the global subscriber for the HTTP service.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_with_sink(config, LogSink::Stdout)
}

/// Install the global subscriber writing to `sink`. `RUST_LOG` wins over the
/// configured level when it parses.
pub fn init_with_sink(config: &TelemetryConfig, sink: LogSink) -> Result<(), TelemetryError> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = filter_for(directives.as_deref(), &config.log_level)?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(false);

    let installed = match sink {
        LogSink::Stdout => builder.try_init(),
        LogSink::Stderr => builder.with_writer(io::stderr).try_init(),
    };
    installed.map_err(TelemetryError::Subscriber)
}

fn filter_for(env_directives: Option<&str>, log_level: &str) -> Result<EnvFilter, TelemetryError> {
    if let Some(filter) = env_directives.and_then(|raw| EnvFilter::try_new(raw).ok()) {
        return Ok(filter);
    }

    EnvFilter::try_new(log_level).map_err(|source| TelemetryError::EnvFilter {
        value: log_level.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_directives_override_configured_level() {
        assert!(filter_for(Some("case_forecast=debug"), "forecast=loud").is_ok());
    }

    #[test]
    fn unparsable_env_directives_fall_back_to_configured_level() {
        assert!(filter_for(Some("forecast=loud"), "info").is_ok());
    }

    #[test]
    fn invalid_configured_level_is_reported() {
        let err = filter_for(None, "forecast=loud").expect_err("level rejected");

        assert!(err.to_string().contains("forecast=loud"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn default_sink_is_stdout() {
        assert_eq!(LogSink::default(), LogSink::Stdout);
    }
}
