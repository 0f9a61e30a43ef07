use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::models::feedback::AIFeedback;
use crate::models::metrics::PhysiqueMetrics;

/// 存储记录：`{user_id, ...字段}`
#[derive(Debug, Serialize)]
pub struct UserRecord<'a, T: Serialize> {
    pub user_id: &'a str,
    #[serde(flatten)]
    pub data: &'a T,
}

impl<'a, T: Serialize> UserRecord<'a, T> {
    pub fn new(user_id: &'a str, data: &'a T) -> Self {
        Self { user_id, data }
    }
}

/// 按用户 ID 插入或更新分析结果
#[async_trait]
pub trait PhysiqueStore: Send + Sync {
    async fn upsert_metrics(&self, user_id: &str, metrics: &PhysiqueMetrics) -> Result<()>;
    async fn upsert_feedback(&self, user_id: &str, feedback: &AIFeedback) -> Result<()>;
    fn store_type(&self) -> &'static str;
}
