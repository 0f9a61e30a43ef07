use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务地址
    pub host: String,
    /// 服务端口
    pub port: u16,
    /// 调试模式（默认日志级别降为 debug）
    #[serde(deserialize_with = "de_flag")]
    pub debug: bool,
    /// 最大请求体大小（字节）
    pub max_request_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            debug: false,
            max_request_size: 10 * 1024 * 1024,
        }
    }
}

/// 跨域配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// 允许的来源，`*` 表示任意来源
    #[serde(deserialize_with = "de_origins")]
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: vec!["http://localhost:3000".into()],
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化（JSON）日志格式
    pub structured: bool,
    /// 日志文件目录，未设置时只输出到标准输出
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            structured: false,
            log_dir: None,
        }
    }
}

/// 记录存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// 存储后端: "supabase" 或 "surrealdb"
    pub backend: String,
    /// 存储服务地址
    pub url: String,
    /// 服务密钥
    pub key: String,
    /// 请求超时（秒）
    pub timeout_secs: u64,
    /// 身体指标表名
    pub metrics_table: String,
    /// AI 反馈表名
    pub feedback_table: String,
    /// SurrealDB 命名空间
    pub namespace: String,
    /// SurrealDB 数据库名称
    pub database: String,
    /// SurrealDB 用户名
    pub username: String,
    /// SurrealDB 密码
    pub password: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "supabase".into(),
            url: String::new(),
            key: String::new(),
            timeout_secs: 10,
            metrics_table: "physique_metrics".into(),
            feedback_table: "ai_feedback".into(),
            namespace: "physique".into(),
            database: "analytics".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// 身份校验配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// 校验后端: "supabase"（远程查询用户）或 "jwt"（本地校验签名）
    pub backend: String,
    /// JWT 签名密钥（仅 jwt 后端）
    pub jwt_secret: String,
    /// JWT 受众
    pub jwt_audience: String,
    /// 远程校验超时（秒）
    pub timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            backend: "supabase".into(),
            jwt_secret: String::new(),
            jwt_audience: "authenticated".into(),
            timeout_secs: 10,
        }
    }
}

/// 姿态推理服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    /// 推理服务地址
    pub base_url: String,
    /// 最小检测置信度
    pub min_detection_confidence: f32,
    /// 推理超时（秒）
    pub timeout_secs: u64,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8500".into(),
            min_detection_confidence: 0.5,
            timeout_secs: 30,
        }
    }
}

/// 图像获取与校验配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// 远程图像获取超时（秒）
    pub fetch_timeout_secs: u64,
    /// 解码后 RGB 数据上限（字节），按 宽 * 高 * 3 估算
    pub max_decoded_bytes: u64,
    /// 远程图像下载体积上限（字节），与上传请求体上限一致
    pub max_download_bytes: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 10,
            max_decoded_bytes: 5 * 1024 * 1024,
            max_download_bytes: ServerConfig::default().max_request_size as u64,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 跨域配置
    pub cors: CorsConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 记录存储配置
    pub store: StoreConfig,
    /// 身份校验配置
    pub auth: AuthConfig,
    /// 姿态推理配置
    pub pose: PoseConfig,
    /// 图像配置
    pub image: ImageConfig,
    /// 应用名称
    pub app_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::default(),
            store: StoreConfig::default(),
            auth: AuthConfig::default(),
            pose: PoseConfig::default(),
            image: ImageConfig::default(),
            app_name: "physique".into(),
        }
    }
}

impl AppConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        let mut config = Self::default();
        config.server.debug = true;
        config.logging.level = "debug".into();
        config.store.url = "http://localhost:54321".into();
        config.store.key = "dev-service-key".into();
        config
    }

    /// 有效日志级别：调试模式下未显式配置时使用 debug
    pub fn effective_log_level(&self) -> &str {
        if self.server.debug && self.logging.level.eq_ignore_ascii_case("info") {
            "debug"
        } else {
            &self.logging.level
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// 接受 `true` / `"True"` / `"1"` 等写法
fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match FlagValue::deserialize(deserializer)? {
        FlagValue::Bool(b) => b,
        FlagValue::Int(i) => i != 0,
        FlagValue::Text(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OriginsValue {
    List(Vec<String>),
    Text(String),
}

/// 接受列表或逗号分隔的字符串
fn de_origins<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match OriginsValue::deserialize(deserializer)? {
        OriginsValue::List(list) => list,
        OriginsValue::Text(text) => text.split(',').map(str::to_string).collect(),
    };

    Ok(raw
        .into_iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect())
}
