use anyhow::anyhow;
use kafka_worker::error::ProcessingError;
use kafka_worker::message::KafkaMessage;
use kafka_worker::worker::MessageProcessor;
use serde_json::Value;
use tracing::info;

/// Logs every message. A payload with `"poison": true` is rejected but still committed.
pub struct LoggingProcessor;

impl MessageProcessor for LoggingProcessor {
    fn process(&self, message: &mut KafkaMessage) -> Result<(), ProcessingError> {
        if message.payload().get("poison").and_then(Value::as_bool) == Some(true) {
            return Err(ProcessingError::committable(anyhow!(
                "Message {} is marked as poison",
                message.queue_identifier()
            )));
        }

        let payload = serde_json::to_string(message.payload()).map_err(ProcessingError::failed)?;

        info!(
            "Processing job '{}', identifier {}: {}",
            message.job_name(),
            message.queue_identifier(),
            payload
        );

        Ok(())
    }
}
