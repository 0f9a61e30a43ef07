use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 身体指标
///
/// 对外 JSON 字段为 camelCase，与前端 `PhysiqueMetrics` 类型一致。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysiqueMetrics {
    /// 身高 (cm)
    pub height: f64,
    /// 体重 (kg)
    pub weight: f64,
    /// 体脂率 (%)
    pub body_fat: f64,
    /// 肌肉量 (%)
    pub muscle_mass: f64,
    /// 胸围 (cm)
    pub chest: f64,
    /// 腰围 (cm)
    pub waist: f64,
    /// 臀围 (cm)
    pub hips: f64,
    /// 大腿围 (cm)
    pub thighs: f64,
    /// 臂围 (cm)
    pub arms: f64,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_json_field_names() {
        let metrics = PhysiqueMetrics {
            height: 175.0,
            weight: 75.0,
            body_fat: 20.0,
            muscle_mass: 40.0,
            chest: 50.0,
            waist: 80.0,
            hips: 100.0,
            thighs: 60.0,
            arms: 30.0,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };

        let json = serde_json::to_value(&metrics).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "arms", "bodyFat", "chest", "createdAt", "height", "hips", "muscleMass", "thighs",
                "waist", "weight"
            ]
        );
        assert_eq!(json["createdAt"], "2024-05-01T12:00:00Z");
    }
}
