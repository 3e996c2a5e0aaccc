use crate::domain::{DomainError, DomainResult, InboundEvent, MessageSource, SubscriberTransport};
use crate::gcp::AccessTokenProvider;
use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_PUBSUB_BASE_URL: &str = "https://pubsub.googleapis.com";

/// Pub/Sub REST client implementing both the acknowledge and pull sides of
/// the transport.
#[derive(Clone)]
pub struct PubSubClient {
    http: Client,
    auth: Arc<dyn AccessTokenProvider>,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AcknowledgeRequest<'a> {
    ack_ids: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PullRequest {
    max_messages: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullResponse {
    #[serde(default)]
    received_messages: Vec<ReceivedMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceivedMessage {
    ack_id: String,
    #[serde(default)]
    message: Option<PubSubMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PubSubMessage {
    /// Base64-encoded payload, as the API delivers it.
    #[serde(default)]
    data: Option<String>,
}

impl PubSubClient {
    pub fn new(http: Client, auth: Arc<dyn AccessTokenProvider>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            auth,
            base_url: base_url.into(),
        }
    }

    fn subscription_url(&self, subscription: &str, verb: &str) -> String {
        format!("{}/v1/{}:{}", self.base_url, subscription, verb)
    }

    async fn post<B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, anyhow::Error> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| anyhow::Error::new(e).context("transport request failed"))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("transport call failed: {status} - {detail}"));
        }

        Ok(response)
    }
}

#[async_trait]
impl SubscriberTransport for PubSubClient {
    async fn acknowledge(&self, subscription: &str, ack_ids: &[String]) -> DomainResult<()> {
        let url = self.subscription_url(subscription, "acknowledge");
        self.post(&url, &AcknowledgeRequest { ack_ids })
            .await
            .map_err(DomainError::Transport)?;

        debug!(subscription, count = ack_ids.len(), "acknowledged messages");
        Ok(())
    }
}

#[async_trait]
impl MessageSource for PubSubClient {
    async fn pull(
        &self,
        subscription: &str,
        max_messages: usize,
    ) -> DomainResult<Vec<InboundEvent>> {
        let url = self.subscription_url(subscription, "pull");
        let response = self
            .post(&url, &PullRequest { max_messages })
            .await
            .map_err(DomainError::Transport)?;

        let pulled: PullResponse = response
            .json()
            .await
            .map_err(|e| {
                DomainError::Transport(anyhow::Error::new(e).context("invalid pull response"))
            })?;

        let events = pulled
            .received_messages
            .into_iter()
            .map(|received| InboundEvent {
                data: received.message.and_then(|m| m.data),
                ack_id: Some(received.ack_id),
                subscription: Some(subscription.to_string()),
            })
            .collect();

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_url() {
        let client = PubSubClient::new(
            Client::new(),
            Arc::new(crate::gcp::StaticTokenProvider::new("t")),
            DEFAULT_PUBSUB_BASE_URL,
        );

        assert_eq!(
            client.subscription_url("projects/p/subscriptions/s", "acknowledge"),
            "https://pubsub.googleapis.com/v1/projects/p/subscriptions/s:acknowledge"
        );
    }

    #[test]
    fn test_acknowledge_request_wire_shape() {
        let ack_ids = vec!["a1".to_string(), "a2".to_string()];

        let json = serde_json::to_value(AcknowledgeRequest { ack_ids: &ack_ids }).unwrap();

        assert_eq!(json, serde_json::json!({"ackIds": ["a1", "a2"]}));
    }

    #[test]
    fn test_pull_request_wire_shape() {
        let json = serde_json::to_value(PullRequest { max_messages: 25 }).unwrap();

        assert_eq!(json, serde_json::json!({"maxMessages": 25}));
    }

    #[test]
    fn test_pull_response_parsing() {
        let json = r#"{
            "receivedMessages": [
                {
                    "ackId": "ack-1",
                    "message": {
                        "data": "eyJsZXZlbCI6IklORk8ifQ==",
                        "messageId": "m-1",
                        "publishTime": "2024-01-01T00:00:00Z"
                    }
                },
                {"ackId": "ack-2"}
            ]
        }"#;

        let pulled: PullResponse = serde_json::from_str(json).unwrap();

        assert_eq!(pulled.received_messages.len(), 2);
        assert_eq!(pulled.received_messages[0].ack_id, "ack-1");
        assert_eq!(
            pulled.received_messages[0]
                .message
                .as_ref()
                .and_then(|m| m.data.as_deref()),
            Some("eyJsZXZlbCI6IklORk8ifQ==")
        );
        assert!(pulled.received_messages[1].message.is_none());
    }

    #[test]
    fn test_empty_pull_response_parsing() {
        let pulled: PullResponse = serde_json::from_str("{}").unwrap();

        assert!(pulled.received_messages.is_empty());
    }
}
