#[cfg(test)]
mod analysis_router_tests {
    use async_trait::async_trait;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        response::Response,
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api::{app_state::AppState, create_router};
    use crate::config::config::AppConfig;
    use crate::error::{AppError, Result};
    use crate::observability::AppMetrics;
    use crate::security::auth::IdentityVerifier;
    use crate::services::analysis::tests::{FakeEstimator, FakeStore, full_pose, pipeline};
    use crate::services::ingestion::tests::{gif_bytes, png_bytes};

    /// Accepts `token-<user>` and resolves it to `<user>`
    struct FakeVerifier;

    #[async_trait]
    impl IdentityVerifier for FakeVerifier {
        async fn verify(&self, token: &str) -> Result<String> {
            token
                .strip_prefix("token-")
                .map(str::to_string)
                .ok_or_else(|| AppError::Authentication("unknown token".to_string()))
        }

        fn verifier_type(&self) -> &'static str {
            "fake"
        }
    }

    struct Harness {
        app: Router,
        estimator: Arc<FakeEstimator>,
        store: Arc<FakeStore>,
        metrics: Arc<AppMetrics>,
    }

    fn harness(estimator: FakeEstimator, store: FakeStore) -> Harness {
        let estimator = Arc::new(estimator);
        let store = Arc::new(store);
        let metrics = Arc::new(AppMetrics::new().unwrap());
        let state = AppState::new(
            Arc::new(pipeline(estimator.clone(), store.clone())),
            Arc::new(FakeVerifier),
            metrics.clone(),
        );
        Harness {
            app: create_router(state, &AppConfig::default()),
            estimator,
            store,
            metrics,
        }
    }

    async fn image_server(expected_fetches: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(8, 8)))
            .expect(expected_fetches)
            .mount(&server)
            .await;
        server
    }

    fn analyze_request(body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/analyze-image")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn upload_request(file: Vec<u8>) -> Request<Body> {
        let boundary = "physique-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"photo\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&file);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn keys(value: &Value) -> Vec<String> {
        let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[tokio::test]
    async fn test_full_pose_returns_metrics_and_feedback() {
        let server = image_server(1).await;
        let h = harness(FakeEstimator::detecting(full_pose()), FakeStore::new(false));

        let response = h
            .app
            .oneshot(analyze_request(
                json!({"imageUrl": format!("{}/photo.png", server.uri()), "userId": "user-1"}),
                Some("token-user-1"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );

        let json = json_body(response).await;
        assert_eq!(keys(&json), vec!["feedback", "metrics"]);
        assert_eq!(
            keys(&json["metrics"]),
            vec![
                "arms", "bodyFat", "chest", "createdAt", "height", "hips", "muscleMass",
                "thighs", "waist", "weight"
            ]
        );
        assert_eq!(
            keys(&json["feedback"]),
            vec![
                "areasToImprove", "bodyType", "createdAt", "improvements",
                "overallAssessment", "poseAnalysis", "postureGrade", "recommendations",
                "strengths", "symmetryScore"
            ]
        );
        assert_eq!(json["feedback"]["symmetryScore"], 85);
        assert_eq!(json["feedback"]["poseAnalysis"]["currentPose"], "Standing");
        assert_eq!(h.store.calls.load(Ordering::SeqCst), 2);
        assert_eq!(h.metrics.analysis_count("analyze_image", "success"), 1);
    }

    #[tokio::test]
    async fn test_no_detection_is_400_without_store_call() {
        let server = image_server(1).await;
        let h = harness(FakeEstimator::empty(), FakeStore::new(false));

        let response = h
            .app
            .oneshot(analyze_request(
                json!({"imageUrl": format!("{}/photo.png", server.uri()), "userId": "user-1"}),
                Some("token-user-1"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({"error": "No person detected in image"})
        );
        assert_eq!(h.store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_principal_mismatch_is_401_before_fetch() {
        let server = image_server(0).await;
        let h = harness(FakeEstimator::detecting(full_pose()), FakeStore::new(false));

        let response = h
            .app
            .oneshot(analyze_request(
                json!({"imageUrl": format!("{}/photo.png", server.uri()), "userId": "user-2"}),
                Some("token-user-1"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await, json!({"error": "Unauthorized user"}));
        assert_eq!(h.estimator.calls.load(Ordering::SeqCst), 0);
        server.verify().await;
    }

    #[tokio::test]
    async fn test_missing_bearer_is_401() {
        let server = image_server(0).await;
        let h = harness(FakeEstimator::detecting(full_pose()), FakeStore::new(false));

        let response = h
            .app
            .oneshot(analyze_request(
                json!({"imageUrl": format!("{}/photo.png", server.uri()), "userId": "user-1"}),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        server.verify().await;
    }

    #[tokio::test]
    async fn test_malformed_requests_are_400() {
        let h = harness(FakeEstimator::detecting(full_pose()), FakeStore::new(false));

        let response = h
            .app
            .clone()
            .oneshot(analyze_request(json!({"userId": "user-1"}), Some("token-user-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({"error": "Missing imageUrl or userId"})
        );

        let response = h
            .app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/analyze-image")
                    .header(header::CONTENT_TYPE, "text/plain")
                    .body(Body::from("hello"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": "Request must be JSON"}));
    }

    #[tokio::test]
    async fn test_storage_failure_is_500_with_results() {
        let server = image_server(1).await;
        let h = harness(FakeEstimator::detecting(full_pose()), FakeStore::new(true));

        let response = h
            .app
            .oneshot(analyze_request(
                json!({"imageUrl": format!("{}/photo.png", server.uri()), "userId": "user-1"}),
                Some("token-user-1"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert_eq!(json["error"], "Failed to save data");
        assert_eq!(json["metrics"]["height"], 175.0);
        assert_eq!(json["feedback"]["postureGrade"], 80);
        assert_eq!(h.metrics.analysis_count("analyze_image", "persistence"), 1);
    }

    #[tokio::test]
    async fn test_gif_upload_is_400_without_inference() {
        let h = harness(FakeEstimator::detecting(full_pose()), FakeStore::new(false));

        let response = h.app.oneshot(upload_request(gif_bytes())).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({"error": "Invalid image format. Supported formats: JPEG, PNG"})
        );
        assert_eq!(h.estimator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_png_upload_returns_quick_assessment() {
        let h = harness(FakeEstimator::detecting(full_pose()), FakeStore::new(false));

        let response = h.app.oneshot(upload_request(png_bytes(8, 8))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["body_fat_percentage"], 20.0);
        assert_eq!(json["muscle_group_scores"]["shoulders"], 90);
        assert_eq!(h.store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_health_and_metrics_routes() {
        let h = harness(FakeEstimator::empty(), FakeStore::new(false));

        let response = h
            .app
            .clone()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"status": "ok"}));

        h.metrics.record_analysis("analyze", "success");
        let response = h
            .app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("physique_analyses_total"));
    }
}
