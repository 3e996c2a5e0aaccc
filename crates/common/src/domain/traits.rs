use crate::domain::{DomainResult, InboundEvent, LogEntry};
use async_trait::async_trait;

/// Trait for the durable log store the service writes to.
///
/// Implementations should:
/// - Commit the record durably (at-least-once semantics are assumed of the
///   store itself)
/// - Return error if the write fails
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Write a structured log record.
    async fn log_struct(&self, entry: &LogEntry) -> DomainResult<()>;

    /// Write a plain-text diagnostic record.
    async fn log_text(&self, text: &str) -> DomainResult<()>;
}

/// Trait for acknowledging deliveries with the message transport.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SubscriberTransport: Send + Sync {
    /// Acknowledge the given delivery handles on a subscription so the
    /// transport stops redelivering them.
    async fn acknowledge(&self, subscription: &str, ack_ids: &[String]) -> DomainResult<()>;
}

/// Trait for pulling delivered events from the message transport.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Fetch up to `max_messages` pending events from the subscription.
    /// Returns an empty batch when nothing is pending.
    async fn pull(
        &self,
        subscription: &str,
        max_messages: usize,
    ) -> DomainResult<Vec<InboundEvent>>;
}
