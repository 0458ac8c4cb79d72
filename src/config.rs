use crate::connection::ConnectionFactory;
use crate::env::{env_opt, LOG_SINK_MINIMUM_LEVEL_ENV, LOG_SINK_REDIS_CONNECTION_ENV, LOG_SINK_REDIS_LIST_KEY_ENV};
use crate::error::SinkError;
use crate::level::{Level, ParseLevelError};
use crate::provider::{SinkProvider, SinkProviderBuilder};
use serde::Deserialize;
use std::sync::Arc;

/// Host-facing settings for a [`SinkProvider`].
///
/// Deserializes from camelCase keys:
///
/// ```json
/// { "connection": "localhost:6379", "listKey": "logs", "minimumLevel": "Information" }
/// ```
///
/// Missing `connection` / `listKey` are not rejected here; the provider
/// builder reports them when the provider is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkConfig {
    #[serde(default)]
    pub connection: Option<String>,
    #[serde(default)]
    pub list_key: Option<String>,
    #[serde(default)]
    pub minimum_level: Level,
}

impl SinkConfig {
    /// Read settings from `LOG_SINK_*` environment variables.
    pub fn from_env() -> Result<Self, ParseLevelError> {
        let minimum_level = match env_opt(LOG_SINK_MINIMUM_LEVEL_ENV) {
            Some(raw) => raw.parse()?,
            None => Level::default(),
        };
        Ok(SinkConfig {
            connection: env_opt(LOG_SINK_REDIS_CONNECTION_ENV),
            list_key: env_opt(LOG_SINK_REDIS_LIST_KEY_ENV),
            minimum_level,
        })
    }

    pub fn into_builder(self) -> SinkProviderBuilder {
        SinkProvider::builder()
            .maybe_descriptor(self.connection)
            .maybe_list_key(self.list_key)
            .minimum_level(self.minimum_level)
    }

    /// Build a provider that talks to Redis.
    pub fn connect(self) -> Result<SinkProvider, SinkError> {
        self.into_builder().build()
    }

    /// Build a provider through a substitute connection factory.
    pub fn connect_with(self, factory: Arc<dyn ConnectionFactory>) -> Result<SinkProvider, SinkError> {
        self.into_builder().connection_factory(factory).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryConnectionFactory;

    #[test]
    fn deserializes_camel_case() {
        let config: SinkConfig = serde_json::from_str(
            r#"{"connection":"localhost:6379","listKey":"logs","minimumLevel":"warn"}"#,
        )
        .unwrap();
        assert_eq!(config.connection.as_deref(), Some("localhost:6379"));
        assert_eq!(config.list_key.as_deref(), Some("logs"));
        assert_eq!(config.minimum_level, Level::Warning);
    }

    #[test]
    fn minimum_level_defaults_to_trace() {
        let config: SinkConfig = serde_json::from_str(r#"{"connection":"x","listKey":"y"}"#).unwrap();
        assert_eq!(config.minimum_level, Level::Trace);
    }

    #[test]
    fn missing_values_surface_at_build_time() {
        let factory = MemoryConnectionFactory::new();
        let err = SinkConfig::default()
            .connect_with(Arc::new(factory.clone()))
            .err()
            .unwrap();
        assert!(matches!(err, SinkError::MissingDescriptor));
        assert!(factory.connect_calls().is_empty());
    }

    #[test]
    fn builds_provider_with_configured_threshold() {
        let factory = MemoryConnectionFactory::new();
        let config = SinkConfig {
            connection: Some("localhost".to_string()),
            list_key: Some("app-logs".to_string()),
            minimum_level: Level::Error,
        };
        let provider = config.connect_with(Arc::new(factory)).unwrap();
        assert_eq!(provider.list_key(), "app-logs");
        assert_eq!(provider.minimum_level(), Level::Error);
    }
}
