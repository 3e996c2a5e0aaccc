use common::gcp::{DEFAULT_LOGGING_BASE_URL, DEFAULT_PUBSUB_BASE_URL};
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// GCP project the log entries are written under
    pub project_id: String,

    /// Log id used for the custom log entries
    #[serde(default = "default_log_id")]
    pub log_id: String,

    /// Fully qualified subscription path to pull events from
    pub subscription: String,

    /// Pub/Sub API base URL (overridable for emulators)
    #[serde(default = "default_pubsub_base_url")]
    pub pubsub_base_url: String,

    /// Cloud Logging API base URL
    #[serde(default = "default_logging_base_url")]
    pub logging_base_url: String,

    /// Maximum messages fetched per pull
    #[serde(default = "default_pull_batch_size")]
    pub pull_batch_size: usize,

    /// Idle wait in seconds after an empty pull
    #[serde(default = "default_poll_wait_secs")]
    pub poll_wait_secs: u64,

    /// Fixed access token for local development; the metadata server is used
    /// when unset
    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_id() -> String {
    "platform_custom_logs".to_string()
}

fn default_pubsub_base_url() -> String {
    DEFAULT_PUBSUB_BASE_URL.to_string()
}

fn default_logging_base_url() -> String {
    DEFAULT_LOGGING_BASE_URL.to_string()
}

fn default_pull_batch_size() -> usize {
    25
}

fn default_poll_wait_secs() -> u64 {
    5
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("LOGBRIDGE"))
            .build()?
            .try_deserialize()
    }
}
