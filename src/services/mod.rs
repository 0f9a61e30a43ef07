//! 服务模块

pub mod analysis;
pub mod assessment;
pub mod feedback_deriver;
pub mod ingestion;
pub mod metrics_deriver;
pub mod pose;

pub use analysis::{
    AnalysisOutcome, AnalysisPipeline, AnalysisResult, AnalysisService, create_analysis_service,
};
pub use assessment::quick_assessment;
pub use feedback_deriver::{FeedbackDeriver, PlaceholderFeedbackDeriver};
pub use ingestion::{ImageIngestor, ImageKind, RawImage};
pub use metrics_deriver::{MetricsDeriver, PlaceholderMetricsDeriver};
pub use pose::{HttpPoseEstimator, PoseEstimator, create_pose_estimator};
