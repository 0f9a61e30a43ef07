//! 图像获取与校验服务
//!
//! 负责从上传内容或远程 URL 取得原始字节，识别编码格式，按像素尺寸估算
//! 解码后大小并在完整解码前拒绝超限图像，最后解码为 RGB 栅格。

use image::{ImageFormat, ImageReader, RgbImage};
use std::io::Cursor;
use std::time::Duration;
use tracing::debug;

use crate::config::config::ImageConfig;
use crate::error::{AppError, Result};

/// 支持的图像编码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    pub const SUPPORTED: &'static str = "JPEG, PNG";

    fn from_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            _ => None,
        }
    }

    fn format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

/// 已识别格式和尺寸、尚未解码的原始图像
#[derive(Debug, Clone)]
pub struct RawImage {
    pub bytes: Vec<u8>,
    pub kind: ImageKind,
    pub width: u32,
    pub height: u32,
}

impl RawImage {
    /// 按 RGB 每像素 3 字节估算的解码后大小
    pub fn decoded_size(&self) -> u64 {
        self.width as u64 * self.height as u64 * 3
    }
}

/// 图像获取器
#[derive(Debug, Clone)]
pub struct ImageIngestor {
    client: reqwest::Client,
    max_decoded_bytes: u64,
    max_download_bytes: u64,
}

impl ImageIngestor {
    pub fn new(config: &ImageConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("image fetch client: {}", e)))?;

        Ok(Self {
            client,
            max_decoded_bytes: config.max_decoded_bytes,
            max_download_bytes: config.max_download_bytes,
        })
    }

    /// 从远程 URL 获取并解码
    pub async fn from_url(&self, url: &str) -> Result<RgbImage> {
        let bytes = self.fetch(url).await?;
        self.from_bytes(bytes).await
    }

    /// 从上传内容解码
    pub async fn from_bytes(&self, bytes: Vec<u8>) -> Result<RgbImage> {
        let raw = self.inspect(bytes)?;
        tokio::task::spawn_blocking(move || decode(raw))
            .await
            .map_err(|e| AppError::Internal(format!("decode task failed: {}", e)))?
    }

    /// 获取远程图像，累计字节数超过 `max_download_bytes` 时立即中止
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let mut response = self.client.get(url).send().await.map_err(fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!(
                "Failed to fetch image from URL (status {})",
                status.as_u16()
            )));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_download_bytes {
                return Err(self.download_too_large());
            }
        }

        let mut buffer = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(fetch_error)? {
            if buffer.len() as u64 + chunk.len() as u64 > self.max_download_bytes {
                return Err(self.download_too_large());
            }
            buffer.extend_from_slice(&chunk);
        }

        debug!("Fetched {} bytes from image URL", buffer.len());
        Ok(buffer)
    }

    fn download_too_large(&self) -> AppError {
        AppError::Validation(format!(
            "Image size exceeds {}MB limit",
            self.max_download_bytes / (1024 * 1024)
        ))
    }

    /// 识别格式并读取尺寸，不做像素解码
    pub fn inspect(&self, bytes: Vec<u8>) -> Result<RawImage> {
        if bytes.is_empty() {
            return Err(AppError::Validation("Image is empty".to_string()));
        }

        let format = image::guess_format(&bytes)
            .map_err(|_| AppError::Decode("unrecognized image encoding".to_string()))?;

        let kind = ImageKind::from_format(format).ok_or_else(|| {
            AppError::Validation(format!(
                "Invalid image format. Supported formats: {}",
                ImageKind::SUPPORTED
            ))
        })?;

        let (width, height) = ImageReader::with_format(Cursor::new(&bytes), kind.format())
            .into_dimensions()
            .map_err(|e| AppError::Decode(e.to_string()))?;

        let raw = RawImage {
            bytes,
            kind,
            width,
            height,
        };

        if raw.decoded_size() > self.max_decoded_bytes {
            return Err(AppError::Validation(format!(
                "Image size exceeds {}MB limit",
                self.max_decoded_bytes / (1024 * 1024)
            )));
        }

        Ok(raw)
    }
}

fn fetch_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::Fetch("request timed out".to_string())
    } else {
        AppError::Fetch(e.to_string())
    }
}

/// 解码为 RGB 栅格
pub fn decode(raw: RawImage) -> Result<RgbImage> {
    let image = image::load_from_memory_with_format(&raw.bytes, raw.kind.format())
        .map_err(|e| AppError::Decode(e.to_string()))?;
    Ok(image.to_rgb8())
}
