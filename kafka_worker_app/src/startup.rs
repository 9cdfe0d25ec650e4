use crate::app_config::AppConfig;
use crate::cli::Cli;
use crate::event_handler::TracingEventHandler;
use crate::processor::LoggingProcessor;
use anyhow::Context;
use kafka_worker::consumer::Factory;
use kafka_worker::error::WorkerError;
use kafka_worker::worker::KafkaWorkerBuilder;
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const RETRY_BACKOFF: Duration = Duration::from_secs(1);

pub async fn run_until_stopped(config: AppConfig, cli: Cli) -> Result<(), anyhow::Error> {
    let factory =
        Factory::from_settings(&config.connection).context("While creating consumer factory")?;

    let mut builder = KafkaWorkerBuilder::new().event_handler(Arc::new(TracingEventHandler));
    if let Some(consume_timeout_ms) = config.consume_timeout_ms {
        builder = builder.consume_timeout(Duration::from_millis(consume_timeout_ms));
    }
    let worker = builder
        .build(factory, Arc::new(LoggingProcessor), config.topics)
        .context("While building kafka worker")?;
    let worker = Arc::new(worker);

    let interrupted = CancellationToken::new();
    tokio::task::spawn(cancel_on_shutdown_signal(interrupted.clone()));

    info!("Worker started. Topics: {:?}", worker.topics());

    while !interrupted.is_cancelled() {
        let worker = worker.clone();
        let token = interrupted.clone();
        let consumer_id = cli.consumer_id.clone();

        let result =
            tokio::task::spawn_blocking(move || worker.work(&token, consumer_id.as_deref()))
                .await
                .context("While running worker cycle")?;

        match result {
            Ok(()) => {}
            Err(e @ WorkerError::InvalidInput(_)) => {
                return Err(e).context("While running worker cycle");
            }
            Err(e) => {
                error!("Worker cycle failed: {e}");
                wait_before_retry(&interrupted).await;
            }
        }
    }

    info!("Worker stopped");

    Ok(())
}

/// Sleeps for [`RETRY_BACKOFF`] unless the worker gets interrupted first.
async fn wait_before_retry(interrupted: &CancellationToken) {
    select! {
        _ = tokio::time::sleep(RETRY_BACKOFF) => {}
        _ = interrupted.cancelled() => {}
    }
}

async fn cancel_on_shutdown_signal(token: CancellationToken) {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Error while listening for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received, stopping after the current cycle");
    token.cancel();
}
