mod config;

use common::gcp::{
    AccessTokenProvider, CloudLoggingStore, MetadataTokenProvider, PubSubClient,
    StaticTokenProvider,
};
use common::telemetry::{init_telemetry, TelemetryConfig};
use config::ServiceConfig;
use ingest_worker::{IngestWorker, IngestWorkerConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = init_telemetry(&TelemetryConfig {
        service_name: "logbridge".to_string(),
        log_level: config.log_level.clone(),
    }) {
        eprintln!("Failed to initialize telemetry: {e}");
        std::process::exit(1);
    }

    info!(
        project_id = %config.project_id,
        subscription = %config.subscription,
        "starting logbridge service"
    );

    let http = match reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to build HTTP client");
            std::process::exit(1);
        }
    };

    let auth: Arc<dyn AccessTokenProvider> = match &config.access_token {
        Some(token) => Arc::new(StaticTokenProvider::new(token.clone())),
        None => Arc::new(MetadataTokenProvider::new(http.clone())),
    };

    let log_store = Arc::new(CloudLoggingStore::new(
        http.clone(),
        auth.clone(),
        &config.logging_base_url,
        &config.project_id,
        &config.log_id,
    ));
    let pubsub = Arc::new(PubSubClient::new(http, auth, &config.pubsub_base_url));

    let worker = IngestWorker::new(
        log_store,
        pubsub.clone(),
        pubsub,
        IngestWorkerConfig {
            subscription: config.subscription.clone(),
            pull_batch_size: config.pull_batch_size,
            poll_wait_secs: config.poll_wait_secs,
        },
    );

    let token = CancellationToken::new();
    let shutdown_token = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                shutdown_token.cancel();
            }
            Err(e) => error!(error = %e, "failed to listen for shutdown signal"),
        }
    });

    if let Err(e) = worker.run(token).await {
        error!(error = %e, "worker exited with error");
        std::process::exit(1);
    }

    info!("logbridge service stopped");
}
