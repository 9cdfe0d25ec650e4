use crate::consumer::RawRecord;
use crate::error::WorkerError;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// A successfully received record together with its JSON payload.
#[derive(Debug)]
pub struct KafkaMessage {
    record: RawRecord,
    payload: Map<String, Value>,
    identifier: Option<String>,
}

impl KafkaMessage {
    /// Decodes the record payload as a JSON object.
    ///
    /// On failure the record is handed back inside [`WorkerError::PayloadDecodingFailed`].
    pub fn new(record: RawRecord) -> Result<Self, WorkerError> {
        let bytes = record.payload().as_deref().unwrap_or_default();

        match serde_json::from_slice(bytes) {
            Ok(payload) => Ok(Self {
                record,
                payload,
                identifier: None,
            }),
            Err(error) => Err(WorkerError::PayloadDecodingFailed {
                record: Box::new(record),
                error,
            }),
        }
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// The topic the message was read from.
    pub fn job_name(&self) -> &str {
        self.record.topic()
    }

    /// The identifier set by [`Self::set_queue_identifier`], or the record offset.
    pub fn queue_identifier(&self) -> String {
        match &self.identifier {
            Some(identifier) => identifier.clone(),
            None => self.record.offset().to_string(),
        }
    }

    pub fn set_queue_identifier(&mut self, identifier: impl Into<String>) -> &mut Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn key(&self) -> Option<&[u8]> {
        self.record.key().as_deref()
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        *self.record.timestamp()
    }

    pub fn record(&self) -> &RawRecord {
        &self.record
    }
}
