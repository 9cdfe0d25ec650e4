use crate::connection_settings::ConnectionSettings;
use crate::consumer::{ConsumerWrapper, RawRecord, RebalancePolicy};
use crate::error::WorkerError;
use rdkafka::error::KafkaError;
use rdkafka::ClientConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// The client operations one worker cycle relies on.
pub trait WorkerConsumer: Send + Sync {
    fn subscribe(&self, topics: &[String]) -> Result<(), WorkerError>;

    /// Polls for a single record, waiting at most `timeout`.
    fn consume(&self, timeout: Duration) -> Result<RawRecord, WorkerError>;

    /// Synchronously commits the offset following `record`.
    fn commit(&self, record: &RawRecord) -> Result<(), WorkerError>;
}

pub trait ConsumerFactory: Send + Sync {
    type Consumer: WorkerConsumer;

    /// Builds a new consumer which is not subscribed to anything yet.
    fn get_consumer(&self, consumer_id: Option<&str>) -> Result<Self::Consumer, WorkerError>;
}

pub struct Factory {
    config: ClientConfig,
    policy: Arc<RebalancePolicy>,
}

impl Factory {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            policy: Arc::new(RebalancePolicy::new()),
        }
    }

    pub fn from_settings(settings: &ConnectionSettings) -> Result<Self, WorkerError> {
        let config = ClientConfig::try_from(settings)?;

        Ok(Self::new(config))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl ConsumerFactory for Factory {
    type Consumer = ConsumerWrapper;

    fn get_consumer(&self, consumer_id: Option<&str>) -> Result<ConsumerWrapper, WorkerError> {
        let Some(consumer_id) = consumer_id else {
            info!("No consumer ID specified. Registering as a dynamic member");
            return Ok(ConsumerWrapper::create(&self.config, self.policy.clone())?);
        };

        let mut static_config = self.config.clone();
        static_config.set(STATIC_MEMBER_PROPERTY, consumer_id);

        match ConsumerWrapper::create(&static_config, self.policy.clone()) {
            Ok(consumer) => {
                info!("Registering as a static member with id {consumer_id}");
                Ok(consumer)
            }
            Err(e) if is_static_membership_rejection(&e) => {
                warn!(
                    "Kafka group.instance.id conf is not supported ({e}). Registering as a dynamic member"
                );
                Ok(ConsumerWrapper::create(&self.config, self.policy.clone())?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

const STATIC_MEMBER_PROPERTY: &str = "group.instance.id";

/// Whether consumer creation failed because of the static membership property itself.
fn is_static_membership_rejection(error: &KafkaError) -> bool {
    match error {
        KafkaError::ClientConfig(_, _, key, _) => key == STATIC_MEMBER_PROPERTY,
        KafkaError::ClientCreation(message) => message.contains(STATIC_MEMBER_PROPERTY),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", "localhost:9092")
            .set("group.id", "test");
        config
    }

    #[test]
    fn dynamic_member_is_created_without_instance_id() {
        let factory = Factory::new(config());

        let consumer = factory.get_consumer(None);

        assert!(consumer.is_ok());
        assert!(factory.config().get("group.instance.id").is_none());
    }

    #[test]
    fn static_member_does_not_leak_instance_id_into_factory_config() {
        let factory = Factory::new(config());

        let consumer = factory.get_consumer(Some("consumer01"));

        assert!(consumer.is_ok());
        assert!(factory.config().get("group.instance.id").is_none());
    }

    #[test]
    fn invalid_configuration_is_reported() {
        let mut config = config();
        config.set("not.a.librdkafka.property", "x");
        let factory = Factory::new(config);

        let result = factory.get_consumer(None);

        assert!(matches!(result, Err(WorkerError::Kafka(_))));
    }

    #[test]
    fn only_instance_id_errors_trigger_dynamic_fallback() {
        use rdkafka::types::RDKafkaConfRes;

        let rejected = KafkaError::ClientConfig(
            RDKafkaConfRes::RD_KAFKA_CONF_UNKNOWN,
            "No such configuration property".to_owned(),
            "group.instance.id".to_owned(),
            "consumer01".to_owned(),
        );
        let unrelated = KafkaError::ClientConfig(
            RDKafkaConfRes::RD_KAFKA_CONF_UNKNOWN,
            "No such configuration property".to_owned(),
            "sesion.timeout.ms".to_owned(),
            "1000".to_owned(),
        );

        assert!(is_static_membership_rejection(&rejected));
        assert!(!is_static_membership_rejection(&unrelated));
        assert!(!is_static_membership_rejection(&KafkaError::ClientCreation(
            "ssl.ca.location: file not found".to_owned()
        )));
    }

    #[test]
    fn unrelated_configuration_error_is_not_masked_for_static_members() {
        let mut config = config();
        config.set("not.a.librdkafka.property", "x");
        let factory = Factory::new(config);

        let result = factory.get_consumer(Some("consumer01"));

        assert!(matches!(result, Err(WorkerError::Kafka(KafkaError::ClientConfig(..)))));
    }
}
