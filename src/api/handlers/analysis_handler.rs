use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};
use validator::Validate;

use crate::{
    api::{app_state::AppState, dto::analysis_dto::*},
    error::{AppError, Result},
    models::assessment::QuickAssessment,
    security::auth::authenticate,
    services::analysis::AnalysisOutcome,
};

const MISSING_FIELDS: &str = "Missing imageUrl or userId";

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// 解析 JSON 请求体
///
/// 非 JSON 请求与缺失/非法字段分别给出不同的 400 消息。
pub fn parse_analyze_request(headers: &HeaderMap, body: &[u8]) -> Result<AnalyzeImageRequest> {
    if !is_json(headers) {
        return Err(AppError::Validation("Request must be JSON".to_string()));
    }

    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|_| AppError::Validation("Request must be JSON".to_string()))?;

    let request: AnalyzeImageRequest = serde_json::from_value(value)
        .map_err(|_| AppError::Validation(MISSING_FIELDS.to_string()))?;

    request.validate().map_err(|e| {
        debug!("Request validation failed: {}", e);
        AppError::Validation(MISSING_FIELDS.to_string())
    })?;

    Ok(request)
}

async fn run_analyze_image(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<AnalysisOutcome> {
    let request = parse_analyze_request(headers, body)?;

    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let identity = authenticate(
        state.identity_verifier.as_ref(),
        auth_header,
        &request.user_id,
    )
    .await?;

    debug!("Analyzing image for user {}", identity.user_id);
    state
        .analysis_service
        .analyze_url(&identity.user_id, &request.image_url)
        .await
}

/// `POST /api/analyze-image`
pub async fn analyze_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match run_analyze_image(&state, &headers, &body).await {
        Ok(AnalysisOutcome::Stored(result)) => {
            state.metrics.record_analysis("analyze_image", "success");
            (StatusCode::OK, Json(result)).into_response()
        }
        Ok(AnalysisOutcome::StorageFailed { result, error }) => {
            state
                .metrics
                .record_analysis("analyze_image", error.kind());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StorageFailedResponse::new(result)),
            )
                .into_response()
        }
        Err(e) => {
            warn!("analyze-image failed: {}", e);
            state.metrics.record_analysis("analyze_image", e.kind());
            e.into_response()
        }
    }
}

async fn read_image_field(multipart: &mut Multipart) -> Result<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?;
            return Ok(bytes.to_vec());
        }
    }

    Err(AppError::Validation("No image file provided".to_string()))
}

async fn run_analyze_upload(
    state: &AppState,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<QuickAssessment> {
    let mut multipart =
        multipart.map_err(|_| AppError::Validation("No image file provided".to_string()))?;
    let bytes = read_image_field(&mut multipart).await?;
    state.analysis_service.analyze_upload(bytes).await
}

/// `POST /api/analyze`
pub async fn analyze_upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    match run_analyze_upload(&state, multipart).await {
        Ok(assessment) => {
            state.metrics.record_analysis("analyze", "success");
            (StatusCode::OK, Json(assessment)).into_response()
        }
        Err(e) => {
            warn!("analyze failed: {}", e);
            state.metrics.record_analysis("analyze", e.kind());
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    #[test]
    fn test_non_json_body_rejected() {
        let result = parse_analyze_request(&HeaderMap::new(), br#"{"imageUrl":"x"}"#);
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Request must be JSON"));

        let result = parse_analyze_request(&json_headers(), b"imageUrl=x");
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Request must be JSON"));
    }

    #[test]
    fn test_missing_field_rejected() {
        let result = parse_analyze_request(
            &json_headers(),
            br#"{"imageUrl": "https://cdn.example.com/a.jpg"}"#,
        );
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == MISSING_FIELDS));
    }

    #[test]
    fn test_charset_suffix_is_json() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        let request = parse_analyze_request(
            &headers,
            br#"{"imageUrl": "https://cdn.example.com/a.jpg", "userId": "u1"}"#,
        )
        .unwrap();
        assert_eq!(request.image_url, "https://cdn.example.com/a.jpg");
    }
}
