//! 上传接口的快速评估
//!
//! 肌群评分为该肌群关键点平均可见度的百分制取整，关键点全部缺失时为 0。

use std::collections::BTreeMap;

use crate::models::assessment::QuickAssessment;
use crate::models::landmark::{LandmarkName, LandmarkSet};
use crate::models::metrics::PhysiqueMetrics;

use LandmarkName::*;

pub const MUSCLE_GROUPS: [(&str, &[LandmarkName]); 5] = [
    ("shoulders", &[LeftShoulder, RightShoulder]),
    ("chest", &[LeftShoulder, RightShoulder, LeftElbow, RightElbow]),
    ("arms", &[LeftElbow, RightElbow, LeftWrist, RightWrist]),
    ("core", &[LeftShoulder, RightShoulder, LeftHip, RightHip]),
    (
        "legs",
        &[LeftHip, RightHip, LeftKnee, RightKnee, LeftAnkle, RightAnkle],
    ),
];

pub fn quick_assessment(landmarks: &LandmarkSet, metrics: &PhysiqueMetrics) -> QuickAssessment {
    let muscle_group_scores: BTreeMap<String, u32> = MUSCLE_GROUPS
        .iter()
        .map(|(group, names)| {
            let score = landmarks
                .mean_visibility(names)
                .map(|v| (v * 100.0).round().clamp(0.0, 100.0) as u32)
                .unwrap_or(0);
            (group.to_string(), score)
        })
        .collect();

    QuickAssessment {
        body_fat_percentage: metrics.body_fat,
        muscle_group_scores,
    }
}
