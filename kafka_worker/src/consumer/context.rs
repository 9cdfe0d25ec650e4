use crate::consumer::RebalancePolicy;
use crate::error::WorkerError;
use rdkafka::consumer::{BaseConsumer, ConsumerContext};
use rdkafka::types::RDKafkaRespErr;
use rdkafka::{ClientContext, TopicPartitionList};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::error;

/// Client context wiring the [`RebalancePolicy`] into the rebalance callback.
///
/// The callback runs inside librdkafka, so a policy failure is parked here
/// and picked up by the next poll on the same consumer.
pub struct WorkerConsumerContext {
    policy: Arc<RebalancePolicy>,
    rebalance_failure: Mutex<Option<WorkerError>>,
}

impl WorkerConsumerContext {
    pub fn new(policy: Arc<RebalancePolicy>) -> Self {
        Self {
            policy,
            rebalance_failure: Mutex::new(None),
        }
    }

    pub fn take_rebalance_failure(&self) -> Option<WorkerError> {
        self.rebalance_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl ClientContext for WorkerConsumerContext {}

impl ConsumerContext for WorkerConsumerContext {
    fn rebalance(
        &self,
        base_consumer: &BaseConsumer<Self>,
        err: RDKafkaRespErr,
        tpl: &mut TopicPartitionList,
    ) {
        if let Err(e) = self.policy.on_rebalance(base_consumer, err, tpl) {
            error!("Rebalance failed: {e}");
            *self
                .rebalance_failure
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::consumer::{ConsumerFactory, Factory, WorkerConsumer};
    use crate::error::WorkerError;
    use rdkafka::consumer::{Consumer, ConsumerContext};
    use rdkafka::error::RDKafkaErrorCode;
    use rdkafka::types::RDKafkaRespErr;
    use rdkafka::{ClientConfig, TopicPartitionList};
    use std::time::Duration;

    #[test]
    fn rebalance_failure_is_returned_by_next_poll_only() {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", "localhost:9092")
            .set("group.id", "test");
        let consumer = Factory::new(config).get_consumer(None).unwrap();

        consumer.context().rebalance(
            &consumer,
            RDKafkaRespErr::RD_KAFKA_RESP_ERR_UNKNOWN_TOPIC_OR_PART,
            &mut TopicPartitionList::new(),
        );

        let first = consumer.consume(Duration::ZERO);
        assert!(matches!(first, Err(WorkerError::Rebalance(_))));

        let second = consumer.consume(Duration::ZERO).unwrap();
        assert_eq!(*second.error(), RDKafkaErrorCode::OperationTimedOut);
    }
}
