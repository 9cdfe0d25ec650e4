use crate::consumer::RawRecord;
use rdkafka::error::KafkaError;

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Error received in kafka message: {}", .0.error())]
    KafkaMessage(Box<RawRecord>),

    #[error("Failed to decode message payload as JSON: {error}")]
    PayloadDecodingFailed {
        record: Box<RawRecord>,
        #[source]
        error: serde_json::Error,
    },

    #[error("Rebalance error: {0}")]
    Rebalance(String),

    #[error(transparent)]
    Kafka(#[from] KafkaError),

    #[error(transparent)]
    Processing(#[from] ProcessingError),
}

impl WorkerError {
    /// Whether the failed message must still be committed.
    pub fn is_committable(&self) -> bool {
        matches!(
            self,
            WorkerError::Processing(ProcessingError::Committable(_))
        )
    }

    /// The record which caused the error, if the error is tied to one.
    pub fn record(&self) -> Option<&RawRecord> {
        match self {
            WorkerError::KafkaMessage(record) => Some(record),
            WorkerError::PayloadDecodingFailed { record, .. } => Some(record),
            _ => None,
        }
    }
}

/// Failure returned by a [`crate::worker::MessageProcessor`].
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    /// The message is considered consumed despite the failure, e.g. a poison message.
    #[error("Committable processing failure: {0:#}")]
    Committable(anyhow::Error),

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl ProcessingError {
    pub fn committable(error: impl Into<anyhow::Error>) -> Self {
        ProcessingError::Committable(error.into())
    }

    pub fn failed(error: impl Into<anyhow::Error>) -> Self {
        ProcessingError::Failed(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdkafka::error::RDKafkaErrorCode;

    #[test]
    fn committable_is_detected_only_for_committable_processing_errors() {
        let committable = WorkerError::from(ProcessingError::committable(anyhow::anyhow!("poison")));
        let failed = WorkerError::from(ProcessingError::failed(anyhow::anyhow!("boom")));
        let invalid = WorkerError::InvalidInput("no consumer".to_owned());

        assert!(committable.is_committable());
        assert!(!failed.is_committable());
        assert!(!invalid.is_committable());
    }

    #[test]
    fn kafka_message_error_keeps_record() {
        let record = RawRecord::from_error(RDKafkaErrorCode::UnknownTopicOrPartition, None);
        let error = WorkerError::KafkaMessage(Box::new(record));

        assert_eq!(
            *error.record().map(RawRecord::error).unwrap(),
            RDKafkaErrorCode::UnknownTopicOrPartition
        );
        assert!(error
            .to_string()
            .starts_with("Error received in kafka message: "));
    }
}
