//! API 模块
//!
//! 提供 REST API 支持。

#[cfg(test)]
mod api_tests;
pub mod app_state;
pub mod dto;
pub mod handlers;
pub mod routes;

use crate::api::app_state::AppState;
use crate::config::config::AppConfig;
use crate::observability::{create_observability_router, trace_layer};
use crate::security::middleware::{cors_layer, security_headers_middleware};
use axum::{Router, extract::DefaultBodyLimit};

pub fn create_router(app_state: AppState, config: &AppConfig) -> Router {
    let api = Router::new().merge(routes::analysis_routes::create_analysis_router());

    Router::new()
        .nest("/api", api)
        .with_state(app_state.clone())
        .merge(create_observability_router(app_state.metrics))
        .layer(DefaultBodyLimit::max(config.server.max_request_size))
        // Add security headers middleware to all routes
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(cors_layer(&config.cors.origins))
        .layer(trace_layer())
}
