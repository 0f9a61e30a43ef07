//! 身体指标推导
//!
//! 当前实现为占位计算：身高、体重、体脂率、肌肉量为常量，围度由肩宽、
//! 髋宽、前臂长度的归一化坐标差按固定比例换算。

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::landmark::{LandmarkName, LandmarkSet};
use crate::models::metrics::PhysiqueMetrics;

/// 归一化坐标差到厘米的换算系数
const SCALE_CM: f64 = 1000.0;

/// 身体指标推导接口
///
/// 输入只有关键点集合与创建时间，不依赖任何隐藏状态。
pub trait MetricsDeriver: Send + Sync {
    fn derive(
        &self,
        landmarks: &LandmarkSet,
        created_at: DateTime<Utc>,
    ) -> Result<PhysiqueMetrics>;
}

#[derive(Debug, Clone, Default)]
pub struct PlaceholderMetricsDeriver;

impl PlaceholderMetricsDeriver {
    pub const REQUIRED: [LandmarkName; 6] = [
        LandmarkName::LeftShoulder,
        LandmarkName::RightShoulder,
        LandmarkName::LeftHip,
        LandmarkName::RightHip,
        LandmarkName::LeftElbow,
        LandmarkName::LeftWrist,
    ];

    pub const HEIGHT_CM: f64 = 175.0;
    pub const WEIGHT_KG: f64 = 75.0;
    pub const BODY_FAT_PERCENT: f64 = 20.0;
    pub const MUSCLE_MASS_PERCENT: f64 = 40.0;
}

impl MetricsDeriver for PlaceholderMetricsDeriver {
    fn derive(
        &self,
        landmarks: &LandmarkSet,
        created_at: DateTime<Utc>,
    ) -> Result<PhysiqueMetrics> {
        landmarks.require_all(&Self::REQUIRED)?;

        let left_shoulder = landmarks.require(LandmarkName::LeftShoulder)?;
        let right_shoulder = landmarks.require(LandmarkName::RightShoulder)?;
        let left_hip = landmarks.require(LandmarkName::LeftHip)?;
        let right_hip = landmarks.require(LandmarkName::RightHip)?;
        let left_elbow = landmarks.require(LandmarkName::LeftElbow)?;
        let left_wrist = landmarks.require(LandmarkName::LeftWrist)?;

        let shoulder_width = (left_shoulder.x - right_shoulder.x).abs() * SCALE_CM;
        let hip_width = (left_hip.x - right_hip.x).abs() * SCALE_CM;
        let arm_length = (left_elbow.y - left_wrist.y).abs() * SCALE_CM;

        Ok(PhysiqueMetrics {
            height: Self::HEIGHT_CM,
            weight: Self::WEIGHT_KG,
            body_fat: Self::BODY_FAT_PERCENT,
            muscle_mass: Self::MUSCLE_MASS_PERCENT,
            chest: shoulder_width * 0.5,
            waist: hip_width * 0.8,
            hips: hip_width,
            thighs: hip_width * 0.6,
            arms: arm_length * 0.3,
            created_at,
        })
    }
}
