//! Tracing subscriber bootstrap shared by the setup binary and `libraryctl`.
//!
//! Logs go to stderr so stdout carries only the verification report.
//! `RUST_LOG` wins over the configured filter when both are present.

use library_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Initialize the global tracing subscriber. A second call is a no-op.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = build_filter(settings)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match settings.format {
        LogFormat::Pretty => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(
            target: "library-telemetry",
            format = ?settings.format,
            "tracing initialized"
        );
    }
    Ok(())
}

fn build_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directive = settings.filter.as_deref().unwrap_or(DEFAULT_FILTER);
    EnvFilter::try_new(directive)
        .map_err(|err| anyhow::anyhow!("invalid telemetry filter '{directive}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_harmless() {
        let settings = TelemetrySettings::default();
        init(&settings).unwrap();
        init(&settings).unwrap();
    }

    #[test]
    fn configured_filter_is_used() {
        let settings = TelemetrySettings {
            format: LogFormat::Json,
            filter: Some("library_setup=debug".to_string()),
        };
        assert!(build_filter(&settings).is_ok());
    }
}
