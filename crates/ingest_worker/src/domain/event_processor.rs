use crate::domain::{build_log_entry, decode_payload};
use common::domain::{DomainError, DomainResult, InboundEvent, LogStore, SubscriberTransport};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Confirmation string returned when both stages complete.
pub const SUCCESS_MESSAGE: &str = "Message Processed Successfully";

/// Result of processing a single envelope. Rendered via `Display` as either
/// the literal confirmation string or `Error: <detail>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Success,
    Failed(String),
}

impl ProcessOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessOutcome::Success)
    }
}

impl fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessOutcome::Success => f.write_str(SUCCESS_MESSAGE),
            ProcessOutcome::Failed(detail) => write!(f, "Error: {detail}"),
        }
    }
}

/// Domain service executing the transform-then-acknowledge protocol for one
/// envelope at a time.
///
/// Flow:
/// 1. Decode the base64 JSON payload and map it to a structured log entry
/// 2. Commit the entry to the log store
/// 3. Acknowledge the delivery with the transport
///
/// Each stage captures its own failures: the error is written to the log
/// store as a plain-text diagnostic and the invocation stops there. A
/// transform failure deliberately skips acknowledgment so the transport
/// redelivers the message. Retry comes for free, at the cost of possible
/// duplicate log entries.
pub struct EventProcessor {
    log_store: Arc<dyn LogStore>,
    transport: Arc<dyn SubscriberTransport>,
}

impl EventProcessor {
    pub fn new(log_store: Arc<dyn LogStore>, transport: Arc<dyn SubscriberTransport>) -> Self {
        Self {
            log_store,
            transport,
        }
    }

    /// Process one envelope. Never panics and never propagates an error;
    /// every failure is reported through the returned outcome.
    #[instrument(skip(self, event), fields(has_data = event.data.is_some()))]
    pub async fn process(&self, event: &InboundEvent) -> ProcessOutcome {
        if let Err(e) = self.transform_and_log(event).await {
            warn!(error = %e, "failed to transform envelope payload");
            self.log_diagnostic(&format!("Error processing Pub/Sub message: {e}"))
                .await;
            return ProcessOutcome::Failed(e.to_string());
        }

        if let Err(e) = self.acknowledge(event).await {
            warn!(error = %e, "failed to acknowledge envelope");
            self.log_diagnostic(&format!("Error acknowledging Pub/Sub message: {e}"))
                .await;
            return ProcessOutcome::Failed(e.to_string());
        }

        ProcessOutcome::Success
    }

    /// Stage A: decode, map, and emit the structured record.
    ///
    /// An envelope without payload data skips this stage entirely; that is
    /// the acknowledge-only path, not an error.
    async fn transform_and_log(&self, event: &InboundEvent) -> DomainResult<()> {
        let Some(encoded) = event.data.as_deref() else {
            debug!("envelope carries no payload data, skipping transform stage");
            return Ok(());
        };

        let payload = decode_payload(encoded)?;
        let entry = build_log_entry(&payload)?;

        debug!(
            severity = %entry.severity,
            extra_keys = entry.extra_payload.len(),
            "emitting structured log entry"
        );
        self.log_store.log_struct(&entry).await
    }

    /// Stage B: confirm receipt with the transport.
    async fn acknowledge(&self, event: &InboundEvent) -> DomainResult<()> {
        let (Some(ack_id), Some(subscription)) =
            (event.ack_id.as_deref(), event.subscription.as_deref())
        else {
            return Err(DomainError::MissingAckInfo);
        };

        self.transport
            .acknowledge(subscription, &[ack_id.to_owned()])
            .await
    }

    /// Best-effort diagnostic write; a failing write is logged and swallowed
    /// so the original failure still reaches the caller.
    async fn log_diagnostic(&self, text: &str) {
        if let Err(e) = self.log_store.log_text(text).await {
            error!(error = %e, "failed to write diagnostic record to log store");
        }
    }
}
