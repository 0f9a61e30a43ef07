//! 分析 DTO
//!
//! 定义分析接口的请求和响应数据结构。

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::feedback::AIFeedback;
use crate::models::metrics::PhysiqueMetrics;
use crate::services::analysis::AnalysisResult;

/// 远程图像分析请求
#[derive(Debug, Deserialize, Validate)]
pub struct AnalyzeImageRequest {
    /// 图像地址
    #[serde(rename = "imageUrl")]
    #[validate(url)]
    pub image_url: String,
    /// 请求所代表的用户
    #[serde(rename = "userId")]
    #[validate(length(min = 1))]
    pub user_id: String,
}

/// 计算成功但写入失败时的响应
#[derive(Debug, Serialize, Deserialize)]
pub struct StorageFailedResponse {
    pub error: String,
    pub metrics: PhysiqueMetrics,
    pub feedback: AIFeedback,
}

impl StorageFailedResponse {
    pub fn new(result: AnalysisResult) -> Self {
        Self {
            error: "Failed to save data".to_string(),
            metrics: result.metrics,
            feedback: result.feedback,
        }
    }
}
