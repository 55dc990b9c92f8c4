pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Screening API
        .route("/api/v1/screenings", post(handlers::handle_screen))
        .route(
            "/api/v1/screenings/batch",
            post(handlers::handle_screen_batch),
        )
        // Resume filter
        .route("/api/v1/resumes/extract", post(handlers::handle_extract))
        .route(
            "/api/v1/resumes/upload/:file_name",
            post(handlers::handle_upload),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::llm_client::executor::tests::ScriptedTransport;
    use crate::screening::pipeline::tests::{pipeline, ANALYSIS, PARSED};

    fn router(outcomes: Vec<Result<String, crate::llm_client::LlmError>>) -> Router {
        let transport = ScriptedTransport::new(outcomes);
        build_router(AppState {
            pipeline: Arc::new(pipeline(transport)),
        })
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_keys_and_provider() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(router(vec![]), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["provider"], "GROQ");
        assert_eq!(body["keys_loaded"], 3);
    }

    #[tokio::test]
    async fn test_screen_returns_pipeline_result() {
        let request = post_json(
            "/api/v1/screenings",
            json!({
                "resume_text": "Jane Doe, Rust engineer",
                "job_requirements": {"job_title": "Backend Engineer", "required_experience_years": 2}
            }),
        );
        let (status, body) = send(
            router(vec![Ok(PARSED.to_string()), Ok(ANALYSIS.to_string())]),
            request,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["parsed_resume"]["name"], "Jane Doe");
        assert_eq!(body["analysis"]["confidence_score"], 81);
    }

    #[tokio::test]
    async fn test_screen_stage_failure_is_still_200() {
        let request = post_json("/api/v1/screenings", json!({"resume_text": "resume"}));
        let (status, body) = send(router(vec![Ok("garbage".to_string())]), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "status": "error",
                "stage": "parsing",
                "error": "Resume parsing failed: Could not extract JSON from response"
            })
        );
    }

    #[tokio::test]
    async fn test_screen_rejects_blank_resume() {
        let request = post_json("/api/v1/screenings", json!({"resume_text": "  "}));
        let (status, body) = send(router(vec![]), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_extract_returns_rows_and_summary() {
        let request = post_json(
            "/api/v1/resumes/extract",
            json!({"resumes": [{"file_name": "jane.txt", "resume_text": "Jane"}]}),
        );
        let (status, body) = send(router(vec![Ok(PARSED.to_string())]), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"][0]["file_name"], "jane.txt");
        assert_eq!(body["rows"][0]["skills"], "Rust, SQL");
        assert_eq!(body["summary"]["successful"], 1);
        assert_eq!(body["failures"], json!([]));
    }

    #[tokio::test]
    async fn test_upload_text_file_runs_parsing_stage() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/resumes/upload/jane.txt")
            .body(Body::from("Jane Doe\nSkills: Rust, SQL"))
            .unwrap();
        let (status, body) = send(router(vec![Ok(PARSED.to_string())]), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["file_name"], "jane.txt");
        assert_eq!(body["result"]["status"], "success");
        assert_eq!(body["result"]["email"], "jane@example.com");
    }

    #[tokio::test]
    async fn test_upload_docx_is_unprocessable() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/resumes/upload/cv.docx")
            .body(Body::from("PK"))
            .unwrap();
        let (status, body) = send(router(vec![]), request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    }
}
