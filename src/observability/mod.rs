//! 可观测性模块
//!
//! 提供 Prometheus 指标、结构化日志和健康检查。

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;
use std::sync::Arc;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::config::config::AppConfig;
use crate::error::{AppError, Result};

// ===== Metrics =====

/// 应用指标
#[derive(Clone)]
pub struct AppMetrics {
    registry: Registry,
    analyses_total: IntCounterVec,
}

impl AppMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let analyses_total = IntCounterVec::new(
            Opts::new("physique_analyses_total", "Analysis requests by endpoint and outcome"),
            &["endpoint", "outcome"],
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;

        registry
            .register(Box::new(analyses_total.clone()))
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Self {
            registry,
            analyses_total,
        })
    }

    /// 记录一次分析请求的结果
    pub fn record_analysis(&self, endpoint: &str, outcome: &str) {
        self.analyses_total
            .with_label_values(&[endpoint, outcome])
            .inc();
    }

    /// 读取计数（测试与诊断用）
    pub fn analysis_count(&self, endpoint: &str, outcome: &str) -> u64 {
        self.analyses_total
            .with_label_values(&[endpoint, outcome])
            .get()
    }

    /// 生成 Prometheus 文本格式指标
    pub fn gather(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

// ===== Health Check =====

/// 健康检查状态
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// 健康检查
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthStatus { status: "ok" }))
}

/// Prometheus 指标端点
pub async fn metrics(State(metrics): State<Arc<AppMetrics>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics.gather(),
    )
}

/// 创建可观测性路由
pub fn create_observability_router(metrics_state: Arc<AppMetrics>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/metrics", get(self::metrics))
        .with_state(metrics_state)
}

type MakeRequestSpan = fn(&Request<Body>) -> Span;

/// 为每个请求创建带请求 ID 的追踪 span
pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, MakeRequestSpan> {
    TraceLayer::new_for_http().make_span_with(request_span as MakeRequestSpan)
}

fn request_span(req: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %req.method(),
        uri = %req.uri().path(),
    )
}

// ===== Structured Logging =====

/// 初始化日志
///
/// `RUST_LOG` 优先，其次为配置的日志级别。配置了 `log_dir` 时额外按天滚动
/// 写入 JSON 日志文件，返回的 guard 需在进程生命周期内保持。
pub fn init_tracing(config: &AppConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},tower_http=info",
            config.effective_log_level().to_ascii_lowercase()
        ))
    });

    let stdout_layer = if config.logging.structured {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .boxed()
    };

    let (file_layer, guard) = match &config.logging.log_dir {
        Some(dir) => {
            let appender =
                tracing_appender::rolling::daily(dir, format!("{}.log", config.app_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .with(env_filter)
        .try_init()
        .map_err(|e| AppError::Config(format!("failed to set tracing subscriber: {}", e)))?;

    Ok(guard)
}
