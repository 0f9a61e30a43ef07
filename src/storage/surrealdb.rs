use async_trait::async_trait;
use serde::Serialize;
use surrealdb::{
    Surreal,
    engine::any::{Any, connect},
    opt::auth::Root,
};
use tracing::debug;

use crate::config::config::StoreConfig;
use crate::error::{AppError, Result};
use crate::models::feedback::AIFeedback;
use crate::models::metrics::PhysiqueMetrics;
use crate::storage::store::{PhysiqueStore, UserRecord};

/// SurrealDB 存储，记录 ID 即用户 ID
#[derive(Clone)]
pub struct SurrealStore {
    db: Surreal<Any>,
    metrics_table: String,
    feedback_table: String,
}

impl SurrealStore {
    /// 连接并认证
    ///
    /// `username` 为空时跳过认证，用于 `mem://` 等内嵌引擎。
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let db: Surreal<Any> = connect(config.url.as_str()).await?;

        if !config.username.is_empty() {
            db.signin(Root {
                username: &config.username,
                password: &config.password,
            })
            .await?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        Ok(Self {
            db,
            metrics_table: config.metrics_table.clone(),
            feedback_table: config.feedback_table.clone(),
        })
    }

    async fn upsert<T: Serialize + Sync>(
        &self,
        table: &str,
        record: &UserRecord<'_, T>,
    ) -> Result<()> {
        let content = serde_json::to_value(record)?;

        self.db
            .query("UPSERT type::thing($table, $id) CONTENT $content")
            .bind(("table", table.to_string()))
            .bind(("id", record.user_id.to_string()))
            .bind(("content", content))
            .await
            .and_then(|response| response.check())
            .map_err(|e| AppError::Persistence(format!("{} upsert failed: {}", table, e)))?;

        debug!("Upserted {} record for user {}", table, record.user_id);
        Ok(())
    }
}

#[async_trait]
impl PhysiqueStore for SurrealStore {
    async fn upsert_metrics(&self, user_id: &str, metrics: &PhysiqueMetrics) -> Result<()> {
        self.upsert(&self.metrics_table, &UserRecord::new(user_id, metrics))
            .await
    }

    async fn upsert_feedback(&self, user_id: &str, feedback: &AIFeedback) -> Result<()> {
        self.upsert(&self.feedback_table, &UserRecord::new(user_id, feedback))
            .await
    }

    fn store_type(&self) -> &'static str {
        "surrealdb"
    }
}
