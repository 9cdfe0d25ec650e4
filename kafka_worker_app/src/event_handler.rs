use kafka_worker::error::WorkerError;
use kafka_worker::message::KafkaMessage;
use kafka_worker::worker::WorkerEventHandler;
use tracing::{debug, error, info, trace};

/// Reports worker lifecycle events as tracing events.
pub struct TracingEventHandler;

impl WorkerEventHandler for TracingEventHandler {
    fn handle_message_received(&self, message: &KafkaMessage) {
        debug!(
            "Message received. Job: '{}', identifier: {}",
            message.job_name(),
            message.queue_identifier()
        );
    }

    fn handle_message_processed(&self, message: &KafkaMessage) {
        info!(
            "Message processed. Job: '{}', identifier: {}",
            message.job_name(),
            message.queue_identifier()
        );
    }

    fn handle_worker_exception(&self, error: &WorkerError) {
        match error.record() {
            Some(record) => error!(
                "Worker exception: {error}. Topic: '{}', partition: {}, offset: {}",
                record.topic(),
                record.partition(),
                record.offset()
            ),
            None => error!("Worker exception: {error}"),
        }
    }

    fn handle_worker_finally(&self) {
        trace!("Worker cycle finished");
    }
}
