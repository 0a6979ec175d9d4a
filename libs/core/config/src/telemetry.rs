use crate::{ConfigError, FromEnv, env_optional};

/// Telemetry settings resolved once at startup.
///
/// Span enrichment (e.g. attaching entity ids to the active request span)
/// is on only when both a service name and a collector endpoint are set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// `SERVICE_NAME`
    pub service_name: Option<String>,
    /// `OTEL_EXPORTER_OTLP_ENDPOINT`
    pub collector_endpoint: Option<String>,
}

impl TelemetryConfig {
    pub fn new(service_name: impl Into<String>, collector_endpoint: impl Into<String>) -> Self {
        Self {
            service_name: Some(service_name.into()),
            collector_endpoint: Some(collector_endpoint.into()),
        }
    }

    /// Telemetry with nothing configured
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        let set = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        set(&self.service_name) && set(&self.collector_endpoint)
    }
}

impl FromEnv for TelemetryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            service_name: env_optional("SERVICE_NAME"),
            collector_endpoint: env_optional("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}
