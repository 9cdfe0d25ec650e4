use crate::error::WorkerError;
use crate::message::KafkaMessage;

/// Observer of worker cycle lifecycle events. Every hook defaults to a no-op.
pub trait WorkerEventHandler: Send + Sync {
    fn handle_message_received(&self, _message: &KafkaMessage) {}

    fn handle_message_processed(&self, _message: &KafkaMessage) {}

    fn handle_worker_exception(&self, _error: &WorkerError) {}

    /// Called once at the end of every cycle which reached message processing.
    fn handle_worker_finally(&self) {}
}

/// Fires [`WorkerEventHandler::handle_worker_finally`] when dropped.
pub(crate) struct FinallyGuard<'a> {
    event_handler: Option<&'a dyn WorkerEventHandler>,
}

impl<'a> FinallyGuard<'a> {
    pub(crate) fn new(event_handler: Option<&'a dyn WorkerEventHandler>) -> Self {
        Self { event_handler }
    }
}

impl Drop for FinallyGuard<'_> {
    fn drop(&mut self) {
        if let Some(event_handler) = self.event_handler {
            event_handler.handle_worker_finally();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingHandler {
        finally_count: AtomicUsize,
    }

    impl WorkerEventHandler for CountingHandler {
        fn handle_worker_finally(&self) {
            self.finally_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn fail(handler: &CountingHandler) -> Result<(), WorkerError> {
        let _finally = FinallyGuard::new(Some(handler as &dyn WorkerEventHandler));
        Err(WorkerError::InvalidInput("boom".to_owned()))
    }

    #[test]
    fn finally_fires_on_error_return() {
        let handler = CountingHandler::default();

        assert!(fail(&handler).is_err());

        assert_eq!(handler.finally_count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn missing_handler_is_skipped() {
        drop(FinallyGuard::new(None));
    }
}
