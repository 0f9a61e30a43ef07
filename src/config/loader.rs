use crate::config::config::AppConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 优先级（后者覆盖前者）：
    /// 1. 内置默认值
    /// 2. ./config.toml
    /// 3. 部署环境变量（SUPABASE_URL、FLASK_PORT 等）
    /// 4. PHYSIQUE_ 前缀的环境变量，`__` 分隔层级
    pub fn load() -> Result<AppConfig, figment::Error> {
        Self::load_from(default_config_path())
    }

    /// 从指定路径加载配置
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig, figment::Error> {
        Self::figment(path.as_ref()).extract()
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(deployment_env())
            .merge(Env::prefixed("PHYSIQUE_").split("__"))
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        match config.store.backend.as_str() {
            "supabase" => {
                if config.store.url.trim().is_empty() || config.store.key.trim().is_empty() {
                    return Err(ConfigValidationError::MissingStoreCredentials);
                }
            }
            "surrealdb" if cfg!(feature = "surrealdb") => {
                if config.store.url.trim().is_empty() {
                    return Err(ConfigValidationError::MissingStoreUrl);
                }
            }
            other => return Err(ConfigValidationError::UnknownBackend(other.to_string())),
        }

        // 远程身份校验复用 Supabase 项目地址与密钥
        match config.auth.backend.as_str() {
            "supabase" => {
                if config.store.url.trim().is_empty() || config.store.key.trim().is_empty() {
                    return Err(ConfigValidationError::MissingStoreCredentials);
                }
            }
            "jwt" if !config.auth.jwt_secret.is_empty() => {}
            "jwt" => return Err(ConfigValidationError::MissingJwtSecret),
            other => return Err(ConfigValidationError::UnknownBackend(other.to_string())),
        }

        if !(0.0..=1.0).contains(&config.pose.min_detection_confidence) {
            return Err(ConfigValidationError::InvalidConfidence(
                config.pose.min_detection_confidence,
            ));
        }

        if config.image.fetch_timeout_secs == 0
            || config.store.timeout_secs == 0
            || config.auth.timeout_secs == 0
            || config.pose.timeout_secs == 0
        {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        if config.image.max_decoded_bytes == 0 || config.image.max_download_bytes == 0 {
            return Err(ConfigValidationError::InvalidSizeLimit);
        }

        Ok(())
    }
}

/// 部署时沿用的环境变量名
fn deployment_env() -> Env {
    Env::raw().filter_map(|key| {
        let mapped = match key.as_str().to_ascii_uppercase().as_str() {
            "CORS_ORIGINS" => "cors.origins",
            "LOG_LEVEL" => "logging.level",
            "FLASK_HOST" => "server.host",
            "FLASK_PORT" => "server.port",
            "FLASK_DEBUG" => "server.debug",
            "SUPABASE_URL" => "store.url",
            "SUPABASE_KEY" => "store.key",
            "SUPABASE_JWT_SECRET" => "auth.jwt_secret",
            _ => return None,
        };
        Some(mapped.into())
    })
}

/// 配置验证错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("服务端口无效，必须大于 0")]
    InvalidPort,

    #[error("SUPABASE_URL and SUPABASE_KEY must be defined in environment variables")]
    MissingStoreCredentials,

    #[error("存储地址未配置")]
    MissingStoreUrl,

    #[error("未知后端: {0}")]
    UnknownBackend(String),

    #[error("jwt 校验需要配置 SUPABASE_JWT_SECRET")]
    MissingJwtSecret,

    #[error("最小检测置信度必须在 [0, 1] 区间内: {0}")]
    InvalidConfidence(f32),

    #[error("超时时间必须大于 0")]
    InvalidTimeout,

    #[error("图像体积上限必须大于 0")]
    InvalidSizeLimit,
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("config.toml")
}
