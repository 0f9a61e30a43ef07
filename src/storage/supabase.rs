//! Supabase (PostgREST) 存储

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::config::config::StoreConfig;
use crate::error::{AppError, Result};
use crate::models::feedback::AIFeedback;
use crate::models::metrics::PhysiqueMetrics;
use crate::storage::store::{PhysiqueStore, UserRecord};

pub struct SupabaseStore {
    client: reqwest::Client,
    rest_url: String,
    key: String,
    metrics_table: String,
    feedback_table: String,
}

impl SupabaseStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("store client: {}", e)))?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            key: config.key.clone(),
            metrics_table: config.metrics_table.clone(),
            feedback_table: config.feedback_table.clone(),
        })
    }

    async fn upsert<T: Serialize + Sync>(
        &self,
        table: &str,
        record: &UserRecord<'_, T>,
    ) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/{}", self.rest_url, table))
            .query(&[("on_conflict", "user_id")])
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(record)
            .send()
            .await
            .map_err(|e| AppError::Persistence(format!("{} upsert failed: {}", table, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Persistence(format!(
                "{} upsert returned {}: {}",
                table,
                status.as_u16(),
                error_text
            )));
        }

        debug!("Upserted {} record for user {}", table, record.user_id);
        Ok(())
    }
}

#[async_trait]
impl PhysiqueStore for SupabaseStore {
    async fn upsert_metrics(&self, user_id: &str, metrics: &PhysiqueMetrics) -> Result<()> {
        self.upsert(&self.metrics_table, &UserRecord::new(user_id, metrics))
            .await
    }

    async fn upsert_feedback(&self, user_id: &str, feedback: &AIFeedback) -> Result<()> {
        self.upsert(&self.feedback_table, &UserRecord::new(user_id, feedback))
            .await
    }

    fn store_type(&self) -> &'static str {
        "supabase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn metrics() -> PhysiqueMetrics {
        PhysiqueMetrics {
            height: 175.0,
            weight: 75.0,
            body_fat: 20.0,
            muscle_mass: 40.0,
            chest: 100.0,
            waist: 96.0,
            hips: 120.0,
            thighs: 72.0,
            arms: 45.0,
            created_at: Utc::now(),
        }
    }

    fn store(url: String) -> SupabaseStore {
        SupabaseStore::new(&StoreConfig {
            url,
            key: "service-key".into(),
            ..StoreConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_upsert_posts_flattened_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/physique_metrics"))
            .and(query_param("on_conflict", "user_id"))
            .and(header("apikey", "service-key"))
            .and(header("authorization", "Bearer service-key"))
            .and(body_partial_json(json!({
                "user_id": "user-1",
                "height": 175.0,
                "bodyFat": 20.0
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        store(server.uri())
            .upsert_metrics("user-1", &metrics())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_backend_error_is_persistence_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
            .mount(&server)
            .await;

        let result = store(server.uri()).upsert_metrics("user-1", &metrics()).await;
        assert!(matches!(result, Err(AppError::Persistence(msg)) if msg.contains("500")));
    }
}
