use crate::domain::{DomainError, DomainResult, LogEntry, LogStore, SourceLocation};
use crate::gcp::AccessTokenProvider;
use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_LOGGING_BASE_URL: &str = "https://logging.googleapis.com";

/// Cloud Logging implementation of [`LogStore`] over the `entries:write`
/// REST endpoint.
#[derive(Clone)]
pub struct CloudLoggingStore {
    http: Client,
    auth: Arc<dyn AccessTokenProvider>,
    base_url: String,
    project_id: String,
    log_id: String,
}

/// `entries:write` request body.
#[derive(Serialize)]
struct WriteEntriesRequest<'a> {
    entries: [EntryBody<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryBody<'a> {
    log_name: String,
    resource: MonitoredResource<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    json_payload: Option<JsonPayload<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_payload: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_location: Option<&'a SourceLocation>,
}

#[derive(Serialize)]
struct MonitoredResource<'a> {
    #[serde(rename = "type")]
    resource_type: &'static str,
    labels: ResourceLabels<'a>,
}

#[derive(Serialize)]
struct ResourceLabels<'a> {
    project_id: &'a str,
}

/// Convert a domain [`LogEntry`] into the `jsonPayload` wire shape.
#[derive(Serialize)]
struct JsonPayload<'a> {
    message: &'a str,
    created_at: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    principal_email: Option<&'a str>,
    payload: &'a Map<String, Value>,
}

impl CloudLoggingStore {
    pub fn new(
        http: Client,
        auth: Arc<dyn AccessTokenProvider>,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        log_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            auth,
            base_url: base_url.into(),
            project_id: project_id.into(),
            log_id: log_id.into(),
        }
    }

    fn log_name(&self) -> String {
        format!("projects/{}/logs/{}", self.project_id, self.log_id)
    }

    fn entry_body(&self) -> EntryBody<'_> {
        EntryBody {
            log_name: self.log_name(),
            resource: MonitoredResource {
                resource_type: "global",
                labels: ResourceLabels {
                    project_id: &self.project_id,
                },
            },
            severity: None,
            json_payload: None,
            text_payload: None,
            source_location: None,
        }
    }

    async fn write_entry(&self, entry: EntryBody<'_>) -> DomainResult<()> {
        let token = self
            .auth
            .access_token()
            .await
            .map_err(DomainError::Store)?;

        let url = format!("{}/v2/entries:write", self.base_url);
        let body = WriteEntriesRequest { entries: [entry] };
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                DomainError::Store(anyhow::Error::new(e).context("log write request failed"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(DomainError::Store(anyhow!(
                "log write failed: {status} - {detail}"
            )));
        }

        debug!(log_name = %self.log_name(), "wrote log entry");
        Ok(())
    }
}

#[async_trait]
impl LogStore for CloudLoggingStore {
    async fn log_struct(&self, entry: &LogEntry) -> DomainResult<()> {
        let mut body = self.entry_body();
        body.severity = Some(&entry.severity);
        body.json_payload = Some(JsonPayload {
            message: &entry.message,
            created_at: &entry.created_at,
            principal_email: entry.principal_email.as_deref(),
            payload: &entry.extra_payload,
        });
        if !entry.source_location.is_empty() {
            body.source_location = Some(&entry.source_location);
        }
        self.write_entry(body).await
    }

    async fn log_text(&self, text: &str) -> DomainResult<()> {
        let mut body = self.entry_body();
        body.text_payload = Some(text);
        self.write_entry(body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CloudLoggingStore {
        CloudLoggingStore::new(
            Client::new(),
            Arc::new(crate::gcp::StaticTokenProvider::new("t")),
            DEFAULT_LOGGING_BASE_URL,
            "my-project",
            "platform_custom_logs",
        )
    }

    #[test]
    fn test_log_name_includes_project_and_log_id() {
        assert_eq!(
            store().log_name(),
            "projects/my-project/logs/platform_custom_logs"
        );
    }

    #[test]
    fn test_structured_entry_wire_shape() {
        let store = store();
        let mut extra = Map::new();
        extra.insert("request_id".to_string(), Value::String("r-1".to_string()));

        let entry = LogEntry {
            severity: "ERROR".to_string(),
            message: "boom".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            principal_email: Some("svc@example.com".to_string()),
            source_location: SourceLocation {
                line: Some(12),
                function: Some("handler".to_string()),
                file: Some("main.py".to_string()),
                module_path: None,
            },
            extra_payload: extra,
        };

        let mut body = store.entry_body();
        body.severity = Some(&entry.severity);
        body.json_payload = Some(JsonPayload {
            message: &entry.message,
            created_at: &entry.created_at,
            principal_email: entry.principal_email.as_deref(),
            payload: &entry.extra_payload,
        });
        body.source_location = Some(&entry.source_location);

        let json = serde_json::to_value(&WriteEntriesRequest { entries: [body] }).unwrap();
        let wire = &json["entries"][0];

        assert_eq!(wire["severity"], "ERROR");
        assert_eq!(wire["jsonPayload"]["message"], "boom");
        assert_eq!(wire["jsonPayload"]["created_at"], "2024-01-01T00:00:00Z");
        assert_eq!(wire["jsonPayload"]["principal_email"], "svc@example.com");
        assert_eq!(wire["jsonPayload"]["payload"]["request_id"], "r-1");
        assert_eq!(wire["sourceLocation"]["line"], 12);
        assert_eq!(wire["sourceLocation"]["file"], "main.py");
        assert_eq!(wire["resource"]["type"], "global");
        assert_eq!(wire["resource"]["labels"]["project_id"], "my-project");
        assert!(wire.get("textPayload").is_none());
    }

    #[test]
    fn test_text_entry_wire_shape() {
        let store = store();
        let mut body = store.entry_body();
        body.text_payload = Some("Error processing Pub/Sub message: bad base64");

        let json = serde_json::to_value(&WriteEntriesRequest { entries: [body] }).unwrap();
        let wire = &json["entries"][0];

        assert_eq!(
            wire["textPayload"],
            "Error processing Pub/Sub message: bad base64"
        );
        assert!(wire.get("jsonPayload").is_none());
        assert!(wire.get("severity").is_none());
    }
}
