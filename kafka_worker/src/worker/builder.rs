use crate::consumer::ConsumerFactory;
use crate::error::WorkerError;
use crate::worker::{KafkaWorker, MessageProcessor, WorkerEventHandler, DEFAULT_CONSUME_TIMEOUT};
use std::sync::Arc;
use std::time::Duration;

pub struct KafkaWorkerBuilder {
    event_handler: Option<Arc<dyn WorkerEventHandler>>,
    consume_timeout: Duration,
}

impl Default for KafkaWorkerBuilder {
    fn default() -> Self {
        Self {
            event_handler: None,
            consume_timeout: DEFAULT_CONSUME_TIMEOUT,
        }
    }
}

impl KafkaWorkerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_handler(mut self, event_handler: Arc<dyn WorkerEventHandler>) -> Self {
        self.event_handler = Some(event_handler);
        self
    }

    pub fn consume_timeout(mut self, consume_timeout: Duration) -> Self {
        self.consume_timeout = consume_timeout;
        self
    }

    pub fn build<F: ConsumerFactory>(
        self,
        factory: F,
        processor: Arc<dyn MessageProcessor>,
        topics: Vec<String>,
    ) -> Result<KafkaWorker<F>, WorkerError> {
        let worker = KafkaWorker::new(factory, topics, processor, self.consume_timeout)?
            .with_event_handler(self.event_handler);

        Ok(worker)
    }
}
