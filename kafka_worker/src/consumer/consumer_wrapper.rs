use crate::consumer::{RawRecord, RebalancePolicy, WorkerConsumer, WorkerConsumerContext};
use crate::error::WorkerError;
use rdkafka::consumer::{BaseConsumer, CommitMode, Consumer};
use rdkafka::error::{KafkaError, KafkaResult, RDKafkaErrorCode};
use rdkafka::{ClientConfig, Offset, TopicPartitionList};
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

pub struct ConsumerWrapper {
    consumer: BaseConsumer<WorkerConsumerContext>,
}

impl ConsumerWrapper {
    pub fn create(config: &ClientConfig, policy: Arc<RebalancePolicy>) -> KafkaResult<Self> {
        let consumer: BaseConsumer<WorkerConsumerContext> =
            config.create_with_context(WorkerConsumerContext::new(policy))?;

        Ok(Self { consumer })
    }
}

impl WorkerConsumer for ConsumerWrapper {
    fn subscribe(&self, topics: &[String]) -> Result<(), WorkerError> {
        let topics = topics.iter().map(String::as_str).collect::<Vec<_>>();
        self.consumer.subscribe(&topics)?;

        Ok(())
    }

    fn consume(&self, timeout: Duration) -> Result<RawRecord, WorkerError> {
        let polled = self.consumer.poll(timeout);

        if let Some(failure) = self.consumer.context().take_rebalance_failure() {
            return Err(failure);
        }

        let record = match polled {
            None => RawRecord::timed_out(),
            Some(Ok(message)) => RawRecord::from(&message),
            Some(Err(e)) => record_from_poll_error(e)?,
        };

        trace!(
            "Polled record. Error: {}, topic: '{}', partition: {}, offset: {}",
            record.error(),
            record.topic(),
            record.partition(),
            record.offset(),
        );

        Ok(record)
    }

    fn commit(&self, record: &RawRecord) -> Result<(), WorkerError> {
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(
            record.topic(),
            *record.partition(),
            Offset::Offset(record.offset() + 1),
        )?;
        self.consumer.commit(&tpl, CommitMode::Sync)?;

        Ok(())
    }
}

/// Turns a message-level poll error into a record carrying its error code.
fn record_from_poll_error(error: KafkaError) -> Result<RawRecord, WorkerError> {
    match error {
        KafkaError::PartitionEOF(partition) => Ok(RawRecord::from_error(
            RDKafkaErrorCode::PartitionEOF,
            Some(partition),
        )),
        KafkaError::MessageConsumption(code) | KafkaError::MessageConsumptionFatal(code) => {
            Ok(RawRecord::from_error(code, None))
        }
        e => Err(e.into()),
    }
}

impl Deref for ConsumerWrapper {
    type Target = BaseConsumer<WorkerConsumerContext>;

    fn deref(&self) -> &Self::Target {
        &self.consumer
    }
}
