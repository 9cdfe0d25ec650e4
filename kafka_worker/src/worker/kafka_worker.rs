use crate::consumer::{ConsumerFactory, Factory, RawRecord, WorkerConsumer};
use crate::error::WorkerError;
use crate::message::KafkaMessage;
use crate::worker::{FinallyGuard, MessageProcessor, WorkerEventHandler};
use rdkafka::error::RDKafkaErrorCode;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

pub const DEFAULT_CONSUME_TIMEOUT: Duration = Duration::from_millis(5000);

/// Runs one consume, process and commit cycle per [`KafkaWorker::work`] call.
///
/// Consumers are created lazily, one per consumer id, and live as long as the worker.
/// Cycles for different consumer ids may run in parallel, a single consumer id must
/// only be driven by one cycle at a time.
pub struct KafkaWorker<F: ConsumerFactory = Factory> {
    factory: F,
    topics: Vec<String>,
    processor: Arc<dyn MessageProcessor>,
    consume_timeout: Duration,
    event_handler: Option<Arc<dyn WorkerEventHandler>>,
    consumers: RwLock<HashMap<String, Arc<F::Consumer>>>,
}

impl<F: ConsumerFactory> KafkaWorker<F> {
    pub fn new(
        factory: F,
        topics: Vec<String>,
        processor: Arc<dyn MessageProcessor>,
        consume_timeout: Duration,
    ) -> Result<Self, WorkerError> {
        if topics.is_empty() {
            return Err(WorkerError::InvalidInput(
                "At least 1 topic must be defined".to_owned(),
            ));
        }

        Ok(Self {
            factory,
            topics,
            processor,
            consume_timeout,
            event_handler: None,
            consumers: RwLock::new(HashMap::new()),
        })
    }

    pub fn with_event_handler(mut self, event_handler: Option<Arc<dyn WorkerEventHandler>>) -> Self {
        self.event_handler = event_handler;
        self
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn processor(&self) -> &Arc<dyn MessageProcessor> {
        &self.processor
    }

    pub fn consume_timeout(&self) -> Duration {
        self.consume_timeout
    }

    pub fn event_handler(&self) -> Option<&Arc<dyn WorkerEventHandler>> {
        self.event_handler.as_ref()
    }

    #[tracing::instrument(skip_all, fields(consumer_id = consumer_id))]
    pub fn work(
        &self,
        interrupted: &CancellationToken,
        consumer_id: Option<&str>,
    ) -> Result<(), WorkerError> {
        let Some(consumer_id) = consumer_id else {
            return Err(WorkerError::InvalidInput(
                "No consumer ID set for the kafka worker".to_owned(),
            ));
        };

        let (consumer, record) = self
            .consume(consumer_id)
            .inspect_err(|e| self.notify_exception(e))?;

        if interrupted.is_cancelled() {
            debug!("Worker interrupted, polled record is left uncommitted");
            return Ok(());
        }

        match *record.error() {
            RDKafkaErrorCode::NoError => {}
            RDKafkaErrorCode::PartitionEOF | RDKafkaErrorCode::OperationTimedOut => {
                trace!("No message available: {}", record.error());
                return Ok(());
            }
            _ => {
                let error = WorkerError::KafkaMessage(Box::new(record));
                self.notify_exception(&error);
                return Err(error);
            }
        }

        self.process(&consumer, record)
    }

    fn consume(&self, consumer_id: &str) -> Result<(Arc<F::Consumer>, RawRecord), WorkerError> {
        let consumer = self.get_or_create_consumer(consumer_id)?;
        let record = consumer.consume(self.consume_timeout)?;

        Ok((consumer, record))
    }

    fn get_or_create_consumer(&self, consumer_id: &str) -> Result<Arc<F::Consumer>, WorkerError> {
        {
            let consumers = self.consumers.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(consumer) = consumers.get(consumer_id) {
                return Ok(consumer.clone());
            }
        }

        // Creation and subscription run unlocked, only the insert takes the write lock.
        let consumer = self.factory.get_consumer(Some(consumer_id))?;
        consumer.subscribe(&self.topics)?;
        info!(
            "Consumer {} subscribed to topics {:?}",
            consumer_id, self.topics
        );

        let mut consumers = self
            .consumers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let consumer = consumers
            .entry(consumer_id.to_owned())
            .or_insert_with(|| Arc::new(consumer))
            .clone();

        Ok(consumer)
    }

    fn process(&self, consumer: &F::Consumer, record: RawRecord) -> Result<(), WorkerError> {
        let _finally = FinallyGuard::new(self.event_handler.as_deref());

        let mut message = KafkaMessage::new(record).inspect_err(|e| self.notify_exception(e))?;
        self.notify(|handler| handler.handle_message_received(&message));

        let result = self
            .processor
            .process(&mut message)
            .map_err(WorkerError::from)
            .and_then(|()| {
                self.notify(|handler| handler.handle_message_processed(&message));
                consumer.commit(message.record())
            });

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_committable() => {
                self.notify_exception(&e);
                consumer.commit(message.record()).inspect_err(|commit_error| {
                    error!(
                        "Failed to commit message {} after committable error '{}': {}",
                        message.queue_identifier(),
                        e,
                        commit_error
                    )
                })?;

                Err(e)
            }
            Err(e) => {
                self.notify_exception(&e);
                Err(e)
            }
        }
    }

    fn notify(&self, hook: impl FnOnce(&dyn WorkerEventHandler)) {
        if let Some(event_handler) = self.event_handler.as_deref() {
            hook(event_handler);
        }
    }

    fn notify_exception(&self, error: &WorkerError) {
        self.notify(|handler| handler.handle_worker_exception(error));
    }
}
