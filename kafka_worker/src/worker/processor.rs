use crate::error::ProcessingError;
use crate::message::KafkaMessage;

/// Business logic run for every decoded message.
///
/// Returning [`ProcessingError::Committable`] commits the message even though processing
/// failed; any other error leaves it uncommitted so it is delivered again.
pub trait MessageProcessor: Send + Sync {
    fn process(&self, message: &mut KafkaMessage) -> Result<(), ProcessingError>;
}
