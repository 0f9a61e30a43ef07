//! 姿态推理适配器

use async_trait::async_trait;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::config::PoseConfig;
use crate::error::{AppError, Result};
use crate::models::landmark::{Landmark, LandmarkName, LandmarkSet};

/// 姿态推理接口
///
/// 实例在进程启动时创建一次并在所有请求间共享，只持有固定配置。
/// 未检测到人体时返回 `AppError::NoDetection`。
#[async_trait]
pub trait PoseEstimator: Send + Sync {
    async fn estimate(&self, image: &RgbImage) -> Result<LandmarkSet>;
    fn estimator_type(&self) -> &'static str;
}

#[derive(Debug, Deserialize)]
struct PoseResponse {
    #[serde(default)]
    landmarks: Vec<WireLandmark>,
}

#[derive(Debug, Deserialize)]
struct WireLandmark {
    name: LandmarkName,
    x: f64,
    y: f64,
    #[serde(default)]
    visibility: f64,
}

/// 远程推理服务客户端
///
/// `POST {base_url}/v1/pose?min_detection_confidence=..`，请求体为 PNG，
/// 响应 `{"landmarks": [{"name", "x", "y", "visibility"}]}`。
pub struct HttpPoseEstimator {
    client: reqwest::Client,
    base_url: String,
    min_detection_confidence: f32,
}

impl HttpPoseEstimator {
    pub fn new(config: &PoseConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("pose client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            min_detection_confidence: config.min_detection_confidence,
        })
    }

    fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buffer)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| AppError::Inference(format!("failed to encode frame: {}", e)))?;
        Ok(buffer)
    }
}

#[async_trait]
impl PoseEstimator for HttpPoseEstimator {
    async fn estimate(&self, image: &RgbImage) -> Result<LandmarkSet> {
        let body = Self::encode_png(image)?;

        let response = self
            .client
            .post(format!("{}/v1/pose", self.base_url))
            .query(&[("min_detection_confidence", self.min_detection_confidence)])
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::Inference(format!("pose service unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Inference(format!(
                "pose service returned {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let parsed: PoseResponse = response
            .json()
            .await
            .map_err(|e| AppError::Inference(format!("invalid pose response: {}", e)))?;

        if parsed.landmarks.is_empty() {
            return Err(AppError::NoDetection);
        }

        debug!("Pose service returned {} landmarks", parsed.landmarks.len());

        LandmarkSet::new(
            parsed
                .landmarks
                .into_iter()
                .map(|l| Landmark::new(l.name, l.x, l.y, l.visibility))
                .collect(),
        )
    }

    fn estimator_type(&self) -> &'static str {
        "http"
    }
}

pub fn create_pose_estimator(config: &PoseConfig) -> Result<Box<dyn PoseEstimator>> {
    Ok(Box::new(HttpPoseEstimator::new(config)?))
}
