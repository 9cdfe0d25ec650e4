use chrono::{DateTime, Utc};
use getset::Getters;
use rdkafka::error::RDKafkaErrorCode;
use rdkafka::message::BorrowedMessage;
use rdkafka::Message;

/// Owned copy of a single poll result.
///
/// A poll that delivered no message (timeout, end of partition, broker-side
/// error) is represented as a record with the corresponding error code and
/// no payload, so the worker can classify every poll outcome the same way.
#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct RawRecord {
    error: RDKafkaErrorCode,
    topic: String,
    partition: i32,
    offset: i64,
    key: Option<Vec<u8>>,
    payload: Option<Vec<u8>>,
    timestamp: Option<DateTime<Utc>>,
}

impl RawRecord {
    pub fn new(
        topic: impl Into<String>,
        partition: i32,
        offset: i64,
        payload: Option<Vec<u8>>,
    ) -> Self {
        Self {
            error: RDKafkaErrorCode::NoError,
            topic: topic.into(),
            partition,
            offset,
            key: None,
            payload,
            timestamp: None,
        }
    }

    pub fn from_error(error: RDKafkaErrorCode, partition: Option<i32>) -> Self {
        Self {
            error,
            topic: String::new(),
            partition: partition.unwrap_or(-1),
            offset: -1,
            key: None,
            payload: None,
            timestamp: None,
        }
    }

    pub fn timed_out() -> Self {
        Self::from_error(RDKafkaErrorCode::OperationTimedOut, None)
    }

    pub fn with_key(mut self, key: Option<Vec<u8>>) -> Self {
        self.key = key;
        self
    }

    pub fn with_timestamp(mut self, timestamp: Option<DateTime<Utc>>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl From<&BorrowedMessage<'_>> for RawRecord {
    fn from(message: &BorrowedMessage<'_>) -> Self {
        let timestamp = message
            .timestamp()
            .to_millis()
            .and_then(DateTime::from_timestamp_millis);

        RawRecord::new(
            message.topic(),
            message.partition(),
            message.offset(),
            message.payload().map(<[u8]>::to_vec),
        )
        .with_key(message.key().map(<[u8]>::to_vec))
        .with_timestamp(timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_no_error() {
        let record = RawRecord::new("topic1", 0, 5, Some(b"{}".to_vec()));

        assert_eq!(*record.error(), RDKafkaErrorCode::NoError);
        assert_eq!(record.topic(), "topic1");
        assert_eq!(*record.offset(), 5);
    }

    #[test]
    fn timed_out_record_carries_no_message() {
        let record = RawRecord::timed_out();

        assert_eq!(*record.error(), RDKafkaErrorCode::OperationTimedOut);
        assert!(record.payload().is_none());
        assert!(record.topic().is_empty());
    }
}
