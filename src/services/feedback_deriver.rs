//! AI 反馈推导
//!
//! 对称性与体态均为两档阶梯函数：
//! - 左右肩纵向差 < 0.05 时对称性 85，否则 70
//! - 左肩与左髋横向差 < 0.1 时体态 80，否则 65

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::feedback::{AIFeedback, PoseAnalysis};
use crate::models::landmark::{LandmarkName, LandmarkSet};

pub const SYMMETRY_EPSILON: f64 = 0.05;
pub const SYMMETRY_HIGH: u32 = 85;
pub const SYMMETRY_LOW: u32 = 70;

pub const POSTURE_EPSILON: f64 = 0.1;
pub const POSTURE_HIGH: u32 = 80;
pub const POSTURE_LOW: u32 = 65;

/// AI 反馈推导接口
pub trait FeedbackDeriver: Send + Sync {
    fn derive(&self, landmarks: &LandmarkSet, created_at: DateTime<Utc>) -> Result<AIFeedback>;
}

/// 肩部纵向对称性评分
pub fn symmetry_score(left_shoulder_y: f64, right_shoulder_y: f64) -> u32 {
    if (left_shoulder_y - right_shoulder_y).abs() < SYMMETRY_EPSILON {
        SYMMETRY_HIGH
    } else {
        SYMMETRY_LOW
    }
}

/// 肩髋横向对齐评分
pub fn posture_grade(shoulder_x: f64, hip_x: f64) -> u32 {
    if (shoulder_x - hip_x).abs() < POSTURE_EPSILON {
        POSTURE_HIGH
    } else {
        POSTURE_LOW
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlaceholderFeedbackDeriver;

impl PlaceholderFeedbackDeriver {
    pub const REQUIRED: [LandmarkName; 5] = [
        LandmarkName::Nose,
        LandmarkName::LeftShoulder,
        LandmarkName::RightShoulder,
        LandmarkName::LeftHip,
        LandmarkName::RightHip,
    ];
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl FeedbackDeriver for PlaceholderFeedbackDeriver {
    fn derive(&self, landmarks: &LandmarkSet, created_at: DateTime<Utc>) -> Result<AIFeedback> {
        landmarks.require_all(&Self::REQUIRED)?;

        let nose = landmarks.require(LandmarkName::Nose)?;
        let left_shoulder = landmarks.require(LandmarkName::LeftShoulder)?;
        let right_shoulder = landmarks.require(LandmarkName::RightShoulder)?;
        let left_hip = landmarks.require(LandmarkName::LeftHip)?;

        let symmetry = symmetry_score(left_shoulder.y, right_shoulder.y);
        let posture = posture_grade(left_shoulder.x, left_hip.x);

        let mut angles = BTreeMap::new();
        angles.insert("shoulder_hip_angle".to_string(), 10.0);

        Ok(AIFeedback {
            body_type: "Athletic".to_string(),
            strengths: strings(&["Balanced shoulders", "Good posture"]),
            improvements: strings(&["Increase core strength", "Improve arm symmetry"]),
            recommendations: strings(&["Incorporate deadlifts", "Add yoga for flexibility"]),
            overall_assessment:
                "Good overall physique with room for core and arm improvements.".to_string(),
            areas_to_improve: strings(&["Core", "Arms"]),
            pose_analysis: PoseAnalysis {
                current_pose: "Standing".to_string(),
                angles,
                confidence: nose.visibility,
                score: symmetry,
            },
            symmetry_score: symmetry,
            posture_grade: posture,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::landmark::Landmark;
    use chrono::TimeZone;
    use rstest::rstest;

    fn pose(shoulder_dy: f64, shoulder_hip_dx: f64) -> LandmarkSet {
        LandmarkSet::new(vec![
            Landmark::new(LandmarkName::Nose, 0.5, 0.1, 0.97),
            Landmark::new(LandmarkName::LeftShoulder, 0.4, 0.3, 0.9),
            Landmark::new(LandmarkName::RightShoulder, 0.6, 0.3 + shoulder_dy, 0.9),
            Landmark::new(LandmarkName::LeftHip, 0.4 + shoulder_hip_dx, 0.6, 0.9),
            Landmark::new(LandmarkName::RightHip, 0.55, 0.6, 0.9),
        ])
        .unwrap()
    }

    #[rstest]
    #[case(0.0, 85)]
    #[case(0.02, 85)]
    #[case(-0.02, 85)]
    #[case(0.10, 70)]
    #[case(-0.10, 70)]
    fn test_symmetry_buckets(#[case] dy: f64, #[case] expected: u32) {
        let feedback = PlaceholderFeedbackDeriver
            .derive(&pose(dy, 0.0), Utc::now())
            .unwrap();
        assert_eq!(feedback.symmetry_score, expected);
        assert_eq!(feedback.pose_analysis.score, expected);
    }

    #[rstest]
    #[case(0.05, 80)]
    #[case(0.2, 65)]
    fn test_posture_buckets(#[case] dx: f64, #[case] expected: u32) {
        let feedback = PlaceholderFeedbackDeriver
            .derive(&pose(0.0, dx), Utc::now())
            .unwrap();
        assert_eq!(feedback.posture_grade, expected);
    }

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(symmetry_score(0.0, 0.05), SYMMETRY_LOW);
        assert_eq!(posture_grade(0.5, 0.5), POSTURE_HIGH);
    }

    #[test]
    fn test_confidence_comes_from_nose() {
        let feedback = PlaceholderFeedbackDeriver
            .derive(&pose(0.0, 0.0), Utc::now())
            .unwrap();
        assert_eq!(feedback.pose_analysis.confidence, 0.97);
        assert_eq!(feedback.pose_analysis.current_pose, "Standing");
        assert_eq!(feedback.pose_analysis.angles["shoulder_hip_angle"], 10.0);
        assert_eq!(feedback.body_type, "Athletic");
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let first = PlaceholderFeedbackDeriver.derive(&pose(0.02, 0.0), at).unwrap();
        let second = PlaceholderFeedbackDeriver.derive(&pose(0.02, 0.0), at).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_nose_fails() {
        let set = LandmarkSet::new(vec![
            Landmark::new(LandmarkName::LeftShoulder, 0.4, 0.3, 0.9),
            Landmark::new(LandmarkName::RightShoulder, 0.6, 0.3, 0.9),
        ])
        .unwrap();
        let result = PlaceholderFeedbackDeriver.derive(&set, Utc::now());
        assert!(matches!(result, Err(AppError::IncompleteLandmarks(_))));
    }
}
