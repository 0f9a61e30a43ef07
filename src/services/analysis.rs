//! 体态分析服务
//!
//! 串联图像获取、姿态推理、指标与反馈推导以及持久化。

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::{AppError, Result};
use crate::models::assessment::QuickAssessment;
use crate::models::feedback::AIFeedback;
use crate::models::metrics::PhysiqueMetrics;
use crate::services::assessment::quick_assessment;
use crate::services::feedback_deriver::FeedbackDeriver;
use crate::services::ingestion::ImageIngestor;
use crate::services::metrics_deriver::MetricsDeriver;
use crate::services::pose::PoseEstimator;
use crate::storage::store::PhysiqueStore;

/// 一次分析的计算结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub metrics: PhysiqueMetrics,
    pub feedback: AIFeedback,
}

/// 分析请求的最终状态
///
/// 计算成功但写入失败时仍携带计算结果。
#[derive(Debug)]
pub enum AnalysisOutcome {
    Stored(AnalysisResult),
    StorageFailed {
        result: AnalysisResult,
        error: AppError,
    },
}

impl AnalysisOutcome {
    pub fn result(&self) -> &AnalysisResult {
        match self {
            Self::Stored(result) | Self::StorageFailed { result, .. } => result,
        }
    }
}

/// 分析服务 trait
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// 获取远程图像，推导指标与反馈并按用户写入
    async fn analyze_url(&self, user_id: &str, image_url: &str) -> Result<AnalysisOutcome>;

    /// 对上传图像做快速评估，不写入存储
    async fn analyze_upload(&self, bytes: Vec<u8>) -> Result<QuickAssessment>;
}

/// 默认分析流水线
pub struct AnalysisPipeline {
    ingestor: ImageIngestor,
    estimator: Arc<dyn PoseEstimator>,
    metrics_deriver: Arc<dyn MetricsDeriver>,
    feedback_deriver: Arc<dyn FeedbackDeriver>,
    store: Arc<dyn PhysiqueStore>,
}

impl AnalysisPipeline {
    pub fn new(
        ingestor: ImageIngestor,
        estimator: Arc<dyn PoseEstimator>,
        metrics_deriver: Arc<dyn MetricsDeriver>,
        feedback_deriver: Arc<dyn FeedbackDeriver>,
        store: Arc<dyn PhysiqueStore>,
    ) -> Self {
        Self {
            ingestor,
            estimator,
            metrics_deriver,
            feedback_deriver,
            store,
        }
    }

    async fn persist(&self, user_id: &str, result: &AnalysisResult) -> Result<()> {
        self.store.upsert_metrics(user_id, &result.metrics).await?;
        self.store.upsert_feedback(user_id, &result.feedback).await?;
        Ok(())
    }
}

impl std::fmt::Debug for AnalysisPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisPipeline")
            .field("ingestor", &self.ingestor)
            .field("estimator", &self.estimator.estimator_type())
            .field("store", &self.store.store_type())
            .finish()
    }
}

#[async_trait]
impl AnalysisService for AnalysisPipeline {
    async fn analyze_url(&self, user_id: &str, image_url: &str) -> Result<AnalysisOutcome> {
        let image = self.ingestor.from_url(image_url).await?;
        debug!("Image decoded: {}x{}", image.width(), image.height());

        let landmarks = self.estimator.estimate(&image).await?;

        let created_at = Utc::now();
        let result = AnalysisResult {
            metrics: self.metrics_deriver.derive(&landmarks, created_at)?,
            feedback: self.feedback_deriver.derive(&landmarks, created_at)?,
        };

        match self.persist(user_id, &result).await {
            Ok(()) => {
                info!("Analysis stored for user {}", user_id);
                Ok(AnalysisOutcome::Stored(result))
            }
            Err(e) => {
                error!("Failed to store analysis for user {}: {}", user_id, e);
                Ok(AnalysisOutcome::StorageFailed { result, error: e })
            }
        }
    }

    async fn analyze_upload(&self, bytes: Vec<u8>) -> Result<QuickAssessment> {
        let image = self.ingestor.from_bytes(bytes).await?;
        let landmarks = self.estimator.estimate(&image).await?;
        let metrics = self.metrics_deriver.derive(&landmarks, Utc::now())?;
        Ok(quick_assessment(&landmarks, &metrics))
    }
}

pub fn create_analysis_service(
    ingestor: ImageIngestor,
    estimator: Arc<dyn PoseEstimator>,
    metrics_deriver: Arc<dyn MetricsDeriver>,
    feedback_deriver: Arc<dyn FeedbackDeriver>,
    store: Arc<dyn PhysiqueStore>,
) -> Box<dyn AnalysisService> {
    Box::new(AnalysisPipeline::new(
        ingestor,
        estimator,
        metrics_deriver,
        feedback_deriver,
        store,
    ))
}
