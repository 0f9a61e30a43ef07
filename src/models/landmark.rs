use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AppError, Result};

/// 33 点人体姿态拓扑中的关键点名称
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkName {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl LandmarkName {
    pub const COUNT: usize = 33;

    /// 按拓扑索引顺序排列的全部名称
    pub const ALL: [LandmarkName; Self::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }
}

impl fmt::Display for LandmarkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个关键点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// 关键点名称
    pub name: LandmarkName,
    /// 归一化 X 坐标 (0.0〜1.0)
    pub x: f64,
    /// 归一化 Y 坐标 (0.0〜1.0)
    pub y: f64,
    /// 可见度/置信度 (0.0〜1.0)
    pub visibility: f64,
}

impl Landmark {
    pub fn new(name: LandmarkName, x: f64, y: f64, visibility: f64) -> Self {
        Self {
            name,
            x,
            y,
            visibility,
        }
    }
}

/// 单次请求内的关键点集合
///
/// 按推理结果顺序保存，构造后不可变。通过名称显式查找，缺失时返回
/// `IncompleteLandmarks` 而不是使用默认值。
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    /// 校验并创建关键点集合
    ///
    /// 非有限值与重复名称会被拒绝；坐标与可见度截断到 [0, 1]。
    pub fn new(points: Vec<Landmark>) -> Result<Self> {
        let mut seen = [false; LandmarkName::COUNT];
        let mut normalized = Vec::with_capacity(points.len());

        for point in points {
            if !(point.x.is_finite() && point.y.is_finite() && point.visibility.is_finite()) {
                return Err(AppError::Inference(format!(
                    "landmark {} has non-finite values",
                    point.name
                )));
            }

            let slot = &mut seen[point.name.index()];
            if *slot {
                return Err(AppError::Inference(format!(
                    "landmark {} reported twice",
                    point.name
                )));
            }
            *slot = true;

            normalized.push(Landmark {
                name: point.name,
                x: point.x.clamp(0.0, 1.0),
                y: point.y.clamp(0.0, 1.0),
                visibility: point.visibility.clamp(0.0, 1.0),
            });
        }

        Ok(Self { points: normalized })
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.points.len()
    }

    pub fn get(&self, name: LandmarkName) -> Option<&Landmark> {
        self.points.iter().find(|p| p.name == name)
    }

    /// 获取必需的关键点
    pub fn require(&self, name: LandmarkName) -> Result<&Landmark> {
        self.get(name)
            .ok_or_else(|| AppError::IncompleteLandmarks(name.to_string()))
    }

    /// 一次性检查多个必需关键点，错误信息列出全部缺失项
    pub fn require_all(&self, names: &[LandmarkName]) -> Result<()> {
        let missing: Vec<&str> = names
            .iter()
            .filter(|n| self.get(**n).is_none())
            .map(|n| n.as_str())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::IncompleteLandmarks(missing.join(", ")))
        }
    }

    /// 指定关键点的平均可见度，全部缺失时为 `None`
    pub fn mean_visibility(&self, names: &[LandmarkName]) -> Option<f64> {
        let values: Vec<f64> = names
            .iter()
            .filter_map(|n| self.get(*n))
            .map(|p| p.visibility)
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }
}
