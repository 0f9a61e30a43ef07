use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 上传接口返回的快速评估
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickAssessment {
    /// 体脂率 (%)
    pub body_fat_percentage: f64,
    /// 各肌群评分 (0-100)
    pub muscle_group_scores: BTreeMap<String, u32>,
}
