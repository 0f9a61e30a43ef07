//! 存储工厂模块
//!
//! 根据配置创建相应的记录存储实例。

use crate::config::config::StoreConfig;
use crate::error::{AppError, Result};
use crate::storage::store::PhysiqueStore;
use crate::storage::supabase::SupabaseStore;

#[cfg(feature = "surrealdb")]
use crate::storage::surrealdb::SurrealStore;

/// 存储工厂
pub struct StorageFactory;

impl StorageFactory {
    /// 根据配置创建存储实例
    pub async fn create(config: &StoreConfig) -> Result<Box<dyn PhysiqueStore>> {
        match config.backend.as_str() {
            "supabase" => Ok(Box::new(SupabaseStore::new(config)?)),
            #[cfg(feature = "surrealdb")]
            "surrealdb" => Ok(Box::new(SurrealStore::connect(config).await?)),
            #[cfg(not(feature = "surrealdb"))]
            "surrealdb" => Err(AppError::Config(
                "SurrealDB feature is not enabled. Enable 'surrealdb' feature to use SurrealDB."
                    .into(),
            )),
            other => Err(AppError::Config(format!("unknown store backend: {}", other))),
        }
    }
}
