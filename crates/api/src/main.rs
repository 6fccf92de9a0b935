use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use framegate_api::config::{ServerConfig, StorageBackend};
use framegate_api::state::AppState;
use framegate_classify::{ClassifierConfig, HttpClassifier};
use framegate_pipeline::{FfmpegExtractor, InMemoryJobRepository, Orchestrator, PipelineConfig};
use framegate_storage::{LocalStore, MemoryStore, ObjectStore, S3Store};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "framegate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let pipeline_config = PipelineConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Object storage ---
    let store: Arc<dyn ObjectStore> = match &config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; objects vanish on restart");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::Local { root } => {
            tracing::info!(root = %root.display(), "Using local filesystem storage");
            Arc::new(LocalStore::new(root.clone()))
        }
        StorageBackend::S3(s3) => {
            tracing::info!(bucket = %s3.bucket, "Using S3 storage");
            Arc::new(S3Store::connect(s3.clone()).await)
        }
    };

    // --- Classifier ---
    let classifier = HttpClassifier::new(ClassifierConfig {
        endpoint: config.classifier_endpoint.clone(),
        api_token: config.classifier_token.clone(),
        timeout_secs: pipeline_config.classify_timeout_secs,
    })
    .expect("Failed to build classification client");

    // --- Pipeline ---
    let extractor = Arc::new(FfmpegExtractor::new(
        Arc::clone(&store),
        pipeline_config.interval_secs,
    ));
    let repo = Arc::new(InMemoryJobRepository::new());
    let max_upload_bytes = pipeline_config.max_upload_bytes;
    let orchestrator = Arc::new(Orchestrator::new(
        store,
        extractor,
        Arc::new(classifier),
        repo,
        pipeline_config,
    ));

    // --- App state and router ---
    let state = AppState {
        orchestrator,
        config: Arc::new(config.clone()),
        max_upload_bytes,
    };
    let app = framegate_api::app(state);

    // --- Start server ---
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("HOST/PORT must form a valid socket address");
    tracing::info!(%addr, "framegate listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app)
        .await
        .expect("Server error");
}
