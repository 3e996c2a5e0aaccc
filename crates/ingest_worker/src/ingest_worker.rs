use crate::domain::EventProcessor;
use crate::pubsub::{ConsumerConfig, PubSubConsumer};
use common::domain::{LogStore, MessageSource, SubscriberTransport};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct IngestWorkerConfig {
    /// Fully qualified subscription path, e.g. `projects/p/subscriptions/s`.
    pub subscription: String,
    pub pull_batch_size: usize,
    pub poll_wait_secs: u64,
}

/// Worker tying the pull consumer to the event processor.
pub struct IngestWorker {
    consumer: PubSubConsumer,
}

impl IngestWorker {
    pub fn new(
        log_store: Arc<dyn LogStore>,
        transport: Arc<dyn SubscriberTransport>,
        source: Arc<dyn MessageSource>,
        config: IngestWorkerConfig,
    ) -> Self {
        info!(subscription = %config.subscription, "initializing ingest worker");

        let processor = Arc::new(EventProcessor::new(log_store, transport));
        let consumer = PubSubConsumer::new(
            source,
            processor,
            ConsumerConfig {
                subscription: config.subscription,
                batch_size: config.pull_batch_size,
                poll_wait: Duration::from_secs(config.poll_wait_secs),
            },
        );

        Self { consumer }
    }

    /// Run the worker until the token is cancelled.
    pub async fn run(&self, token: CancellationToken) -> anyhow::Result<()> {
        self.consumer.run(token).await
    }
}
