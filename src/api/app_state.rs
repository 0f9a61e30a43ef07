use crate::observability::AppMetrics;
use crate::security::auth::IdentityVerifier;
use crate::services::analysis::AnalysisService;
use std::sync::Arc;

/// Application state containing all shared services
///
/// Every handle is built once at startup and shared read-only by all requests.
#[derive(Clone)]
pub struct AppState {
    /// Analysis pipeline (ingestion, pose inference, derivation, persistence)
    pub analysis_service: Arc<dyn AnalysisService>,
    /// Identity verifier for bearer credentials
    pub identity_verifier: Arc<dyn IdentityVerifier>,
    /// Request counters exposed on `/metrics`
    pub metrics: Arc<AppMetrics>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("analysis_service", &"Arc<dyn AnalysisService>")
            .field("identity_verifier", &self.identity_verifier.verifier_type())
            .field("metrics", &"Arc<AppMetrics>")
            .finish()
    }
}

impl AppState {
    /// Create new application state
    pub fn new(
        analysis_service: Arc<dyn AnalysisService>,
        identity_verifier: Arc<dyn IdentityVerifier>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            analysis_service,
            identity_verifier,
            metrics,
        }
    }
}
