use crate::domain::{EventProcessor, ProcessOutcome};
use common::domain::MessageSource;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Fully qualified subscription path to pull from.
    pub subscription: String,
    /// Maximum messages fetched per pull.
    pub batch_size: usize,
    /// Idle wait after an empty batch or a failed pull.
    pub poll_wait: Duration,
}

/// Pull-based consumer feeding delivered events through the processor one at
/// a time. Runs until the cancellation token fires.
pub struct PubSubConsumer {
    source: Arc<dyn MessageSource>,
    processor: Arc<EventProcessor>,
    config: ConsumerConfig,
}

impl PubSubConsumer {
    pub fn new(
        source: Arc<dyn MessageSource>,
        processor: Arc<EventProcessor>,
        config: ConsumerConfig,
    ) -> Self {
        Self {
            source,
            processor,
            config,
        }
    }

    pub async fn run(&self, token: CancellationToken) -> anyhow::Result<()> {
        info!(
            subscription = %self.config.subscription,
            batch_size = self.config.batch_size,
            "starting pull consumer"
        );

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!(subscription = %self.config.subscription, "pull consumer stopping");
                    return Ok(());
                }
                pulled = self.source.pull(&self.config.subscription, self.config.batch_size) => {
                    match pulled {
                        Ok(events) if events.is_empty() => {
                            debug!("no pending messages, idling");
                            tokio::time::sleep(self.config.poll_wait).await;
                        }
                        Ok(events) => {
                            debug!(count = events.len(), "pulled message batch");
                            for event in &events {
                                // Per-event failures are reported, not fatal:
                                // unacknowledged messages come back on the next pull
                                if let ProcessOutcome::Failed(detail) =
                                    self.processor.process(event).await
                                {
                                    warn!(detail = %detail, "event processing failed");
                                }
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "failed to pull messages");
                            tokio::time::sleep(self.config.poll_wait).await;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use common::domain::{
        DomainError, InboundEvent, MockLogStore, MockMessageSource, MockSubscriberTransport,
    };
    use serde_json::json;

    fn event(ack_id: &str) -> InboundEvent {
        InboundEvent {
            data: Some(STANDARD.encode(
                json!({"level": "INFO", "message": "m", "created_at": "t"}).to_string(),
            )),
            ack_id: Some(ack_id.to_string()),
            subscription: Some("projects/p/subscriptions/s".to_string()),
        }
    }

    fn test_config() -> ConsumerConfig {
        ConsumerConfig {
            subscription: "projects/p/subscriptions/s".to_string(),
            batch_size: 10,
            poll_wait: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn test_run_processes_batch_then_stops_on_cancellation() {
        // Arrange
        let mut mock_source = MockMessageSource::new();
        let mut mock_store = MockLogStore::new();
        let mut mock_transport = MockSubscriberTransport::new();

        let token = CancellationToken::new();
        let cancel = token.clone();

        // First pull delivers two events; the second cancels and idles empty
        let mut pulls = 0;
        mock_source
            .expect_pull()
            .returning(move |_, _| {
                pulls += 1;
                if pulls == 1 {
                    Ok(vec![event("a1"), event("a2")])
                } else {
                    cancel.cancel();
                    Ok(Vec::new())
                }
            });

        mock_store.expect_log_struct().times(2).returning(|_| Ok(()));
        mock_transport
            .expect_acknowledge()
            .times(2)
            .returning(|_, _| Ok(()));

        let processor = Arc::new(EventProcessor::new(
            Arc::new(mock_store),
            Arc::new(mock_transport),
        ));
        let consumer = PubSubConsumer::new(Arc::new(mock_source), processor, test_config());

        // Act
        let result = tokio::time::timeout(Duration::from_secs(2), consumer.run(token)).await;

        // Assert
        assert!(result.expect("consumer did not stop").is_ok());
    }

    #[tokio::test]
    async fn test_run_failing_event_does_not_stop_later_events() {
        // Arrange
        let mut mock_source = MockMessageSource::new();
        let mut mock_store = MockLogStore::new();
        let mut mock_transport = MockSubscriberTransport::new();

        let token = CancellationToken::new();
        let cancel = token.clone();

        let mut pulls = 0;
        mock_source
            .expect_pull()
            .returning(move |_, _| {
                pulls += 1;
                if pulls == 1 {
                    let mut bad = event("a1");
                    bad.data = Some("@@not-base64@@".to_string());
                    Ok(vec![bad, event("a2")])
                } else {
                    cancel.cancel();
                    Ok(Vec::new())
                }
            });

        // First event fails transform (diagnostic write), second succeeds
        mock_store.expect_log_text().times(1).returning(|_| Ok(()));
        mock_store.expect_log_struct().times(1).returning(|_| Ok(()));
        mock_transport
            .expect_acknowledge()
            .withf(|_, ack_ids| ack_ids == ["a2".to_string()])
            .times(1)
            .returning(|_, _| Ok(()));

        let processor = Arc::new(EventProcessor::new(
            Arc::new(mock_store),
            Arc::new(mock_transport),
        ));
        let consumer = PubSubConsumer::new(Arc::new(mock_source), processor, test_config());

        // Act
        let result = tokio::time::timeout(Duration::from_secs(2), consumer.run(token)).await;

        // Assert
        assert!(result.expect("consumer did not stop").is_ok());
    }

    #[tokio::test]
    async fn test_run_pull_error_retries_until_cancelled() {
        // Arrange
        let mut mock_source = MockMessageSource::new();
        let mock_store = MockLogStore::new();
        let mock_transport = MockSubscriberTransport::new();

        let token = CancellationToken::new();
        let cancel = token.clone();

        let mut pulls = 0;
        mock_source
            .expect_pull()
            .returning(move |_, _| {
                pulls += 1;
                if pulls >= 2 {
                    cancel.cancel();
                }
                Err(DomainError::Transport(anyhow::anyhow!("pull failed")))
            });

        let processor = Arc::new(EventProcessor::new(
            Arc::new(mock_store),
            Arc::new(mock_transport),
        ));
        let consumer = PubSubConsumer::new(Arc::new(mock_source), processor, test_config());

        // Act
        let result = tokio::time::timeout(Duration::from_secs(2), consumer.run(token)).await;

        // Assert
        assert!(result.expect("consumer did not stop").is_ok());
    }
}
