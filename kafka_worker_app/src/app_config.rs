use anyhow::{bail, Context};
use config::Config;
use kafka_worker::connection_settings::ConnectionSettings;
use serde::Deserialize;
use tracing::info;

#[derive(Deserialize, Debug)]
pub struct AppConfig {
    pub connection: ConnectionSettings,
    pub topics: Vec<String>,
    pub consume_timeout_ms: Option<u64>,
}

impl AppConfig {
    pub fn build(file_name: &str) -> Result<Self, anyhow::Error> {
        let config = Config::builder()
            .add_source(config::File::with_name(file_name))
            .add_source(config::Environment::with_prefix("App").separator("__"))
            .build()
            .context("While building config")?;

        let deserialized_config: AppConfig = config
            .try_deserialize()
            .context("While deserializing config")?;

        if deserialized_config.topics.is_empty() {
            bail!("At least 1 topic must be configured")
        }

        info!("App config: {deserialized_config:?}");

        Ok(deserialized_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kafka_worker::consumer::{AutoOffsetReset, SecurityProtocol};

    #[test]
    fn settings_file_is_deserialized() {
        let config = AppConfig::build(concat!(env!("CARGO_MANIFEST_DIR"), "/appsettings")).unwrap();

        assert_eq!(config.topics, vec!["orders".to_owned()]);
        assert_eq!(config.connection.group_id, "kafka-worker");
        assert_eq!(config.connection.security_protocol, SecurityProtocol::Plaintext);
        assert_eq!(config.connection.auto_offset_reset, AutoOffsetReset::Earliest);
        assert_eq!(config.consume_timeout_ms, Some(5000));
    }
}
