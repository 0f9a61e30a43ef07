use anyhow::Context;
use physique::api::{self, app_state::AppState};
use physique::config::loader::ConfigLoader;
use physique::observability::{AppMetrics, init_tracing};
use physique::security::create_identity_verifier;
use physique::services::{
    ImageIngestor, PlaceholderFeedbackDeriver, PlaceholderMetricsDeriver,
    create_analysis_service, create_pose_estimator,
};
use physique::storage::StorageFactory;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load().context("failed to load configuration")?;
    ConfigLoader::validate(&config).context("invalid configuration")?;

    let _log_guard = init_tracing(&config)?;
    info!("Starting {}...", config.app_name);
    info!("Configuration loaded successfully");

    let store = StorageFactory::create(&config.store).await?;
    info!("Store initialized (backend: {})", store.store_type());

    let estimator = create_pose_estimator(&config.pose)?;
    info!(
        "Pose estimator initialized: {} (min confidence: {})",
        estimator.estimator_type(),
        config.pose.min_detection_confidence
    );

    let identity_verifier = create_identity_verifier(&config.auth, &config.store)?;
    info!("Identity verifier initialized: {}", identity_verifier.verifier_type());

    let analysis_service = create_analysis_service(
        ImageIngestor::new(&config.image)?,
        Arc::from(estimator),
        Arc::new(PlaceholderMetricsDeriver),
        Arc::new(PlaceholderFeedbackDeriver),
        Arc::from(store),
    );
    info!("Analysis service initialized");

    let app_state = AppState::new(
        Arc::from(analysis_service),
        Arc::from(identity_verifier),
        Arc::new(AppMetrics::new()?),
    );
    info!("Application state created");

    let router = api::create_router(app_state, &config);
    info!("API router created with observability endpoints");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
