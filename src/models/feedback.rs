use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 姿态分析
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseAnalysis {
    /// 当前姿势
    pub current_pose: String,
    /// 命名角度（度）
    pub angles: BTreeMap<String, f64>,
    /// 检测置信度
    pub confidence: f64,
    /// 评分
    pub score: u32,
}

/// AI 反馈
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AIFeedback {
    /// 体型
    pub body_type: String,
    /// 优势
    pub strengths: Vec<String>,
    /// 待改进项
    pub improvements: Vec<String>,
    /// 训练建议
    pub recommendations: Vec<String>,
    /// 总体评价
    pub overall_assessment: String,
    /// 重点改进部位
    pub areas_to_improve: Vec<String>,
    /// 姿态分析
    pub pose_analysis: PoseAnalysis,
    /// 对称性评分
    pub symmetry_score: u32,
    /// 体态评分
    pub posture_grade: u32,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}
