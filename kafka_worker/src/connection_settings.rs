use crate::consumer::{AutoOffsetReset, SecurityProtocol};
use crate::error::WorkerError;
use rdkafka::ClientConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionSettings {
    pub brokers: Vec<String>,
    pub group_id: String,
    #[serde(default)]
    pub security_protocol: SecurityProtocol,
    #[serde(default)]
    pub auto_offset_reset: AutoOffsetReset,
    pub session_timeout_ms: Option<u32>,
}

impl TryFrom<&ConnectionSettings> for ClientConfig {
    type Error = WorkerError;

    fn try_from(value: &ConnectionSettings) -> Result<Self, Self::Error> {
        if value.brokers.is_empty() {
            return Err(WorkerError::InvalidInput(
                "No brokers specified".to_owned(),
            ));
        }

        let mut config = ClientConfig::new();

        // https://raw.githubusercontent.com/confluentinc/librdkafka/master/CONFIGURATION.md
        let brokers_string = value.brokers.join(",");
        config
            .set("bootstrap.servers", brokers_string)
            .set("security.protocol", value.security_protocol.to_string())
            .set("group.id", &value.group_id)
            .set("auto.offset.reset", value.auto_offset_reset.to_string())
            .set("enable.auto.commit", "false")
            .set("enable.partition.eof", "false");

        if let Some(session_timeout_ms) = value.session_timeout_ms {
            config.set("session.timeout.ms", session_timeout_ms.to_string());
        }

        if let Ok(value) = std::env::var("RD_KAFKA_DEBUG") {
            config.set("debug", value);
        }

        Ok(config)
    }
}
