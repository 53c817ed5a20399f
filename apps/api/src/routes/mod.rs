pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::agent::handlers as agent;
use crate::analysis::handlers as analysis;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis pipeline: one start/poll pair per kind
        .route(
            "/api/v1/analyses/:kind",
            post(analysis::handle_start_analysis).get(analysis::handle_get_analysis),
        )
        // Direct job-match score
        .route("/api/v1/ats-match", post(agent::handle_ats_match))
        // Chat agent
        .route("/api/v1/agent/chat", post(agent::handle_chat))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::auth::USER_ID_HEADER;
    use crate::llm_client::TextGenerator;
    use crate::models::analysis::{AnalysisResult, SkillGapResult, SlotWrite};
    use crate::storage::{InMemoryResumeStore, ResumeStore};
    use crate::testing::{seed_resume, test_state, ScriptedGateway};

    async fn setup(gateway: Arc<dyn TextGenerator>) -> (Router, Arc<InMemoryResumeStore>, Uuid, Uuid) {
        let (state, store) = test_state(gateway);
        let owner = Uuid::new_v4();
        let resume_id = seed_resume(&store, owner).await;
        (build_router(state), store, owner, resume_id)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, caller: Option<Uuid>, body: Value) -> Request<Body> {
        let mut builder = Request::post(uri).header("content-type", "application/json");
        if let Some(caller) = caller {
            builder = builder.header(USER_ID_HEADER, caller.to_string());
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, caller: Uuid) -> Request<Body> {
        Request::get(uri)
            .header(USER_ID_HEADER, caller.to_string())
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _, _, _) = setup(ScriptedGateway::failing()).await;
        let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "memory");
    }

    #[tokio::test]
    async fn test_start_then_poll_until_completed() {
        let (app, _, owner, resume_id) = setup(ScriptedGateway::failing()).await;

        let (status, body) = send(
            &app,
            post_json("/api/v1/analyses/heatmap", Some(owner), json!({ "resume_id": resume_id })),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["status"], "processing");
        assert_eq!(body["kind"], "heatmap");

        let (status, body) = send(
            &app,
            get(&format!("/api/v1/analyses/heatmap?id={resume_id}&wait_ms=2000"), owner),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "completed");
        assert_eq!(body["result"]["kind"], "heatmap");
        assert!(body["result"]["formatting_score"].as_u64().unwrap() >= 50);
        assert!(body["last_analyzed"].is_string());
    }

    #[tokio::test]
    async fn test_poll_without_wait_returns_pending_slot() {
        let (app, _, owner, resume_id) = setup(ScriptedGateway::failing()).await;
        let (status, body) = send(
            &app,
            get(&format!("/api/v1/analyses/integrity?id={resume_id}"), owner),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "pending");
        assert!(body["result"].is_null());
    }

    #[tokio::test]
    async fn test_gateway_failure_is_only_visible_by_polling() {
        let (app, _, owner, resume_id) = setup(ScriptedGateway::failing()).await;
        let (status, _) = send(
            &app,
            post_json("/api/v1/analyses/career-path", Some(owner), json!({ "resume_id": resume_id })),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let uri = format!("/api/v1/analyses/career-path?id={resume_id}&wait_ms=2000");
        let (_, body) = send(&app, get(&uri, owner)).await;
        assert_eq!(body["status"], "failed");
        assert!(body["result"].is_null());
    }

    #[tokio::test]
    async fn test_request_errors() {
        let (app, _, owner, resume_id) = setup(ScriptedGateway::failing()).await;

        let (status, _) = send(
            &app,
            post_json("/api/v1/analyses/heatmap", None, json!({ "resume_id": resume_id })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            post_json("/api/v1/analyses/rag-tailoring", Some(owner), json!({ "resume_id": resume_id })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, _) = send(
            &app,
            post_json("/api/v1/analyses/heatmap", Some(owner), json!({ "resume_id": Uuid::new_v4() })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            post_json("/api/v1/analyses/heatmap", Some(Uuid::new_v4()), json!({ "resume_id": resume_id })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            get(&format!("/api/v1/analyses/heatmap?id={resume_id}"), Uuid::new_v4()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_kind_is_rejected_at_the_path() {
        let (app, _, owner, resume_id) = setup(ScriptedGateway::failing()).await;
        let (status, _) = send(
            &app,
            post_json("/api/v1/analyses/ats-matcher", Some(owner), json!({ "resume_id": resume_id })),
        )
        .await;
        assert!(status.is_client_error());
        assert_ne!(status, StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_quantification_round_trip_over_http() {
        let gateway = ScriptedGateway::replying("1. Ran 1,200 tests nightly\n2. Wrote 40 pages");
        let (app, _, owner, resume_id) = setup(gateway).await;

        let (status, _) = send(
            &app,
            post_json(
                "/api/v1/analyses/quantification",
                Some(owner),
                json!({ "resume_id": resume_id, "bullet_points": "Ran tests\nWrote docs" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let uri = format!("/api/v1/analyses/quantification?id={resume_id}&wait_ms=2000");
        let (_, body) = send(&app, get(&uri, owner)).await;
        assert_eq!(body["status"], "completed");
        let pairs = body["result"]["quantified_bullet_points"].as_array().unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0]["original"], "Ran tests");
        assert_eq!(pairs[1]["quantified"], "Wrote 40 pages");
    }

    #[tokio::test]
    async fn test_chat_runs_the_chosen_tool() {
        let gateway = ScriptedGateway::replying(
            r#"{"tool":"skill_gap_analysis","args":{"target_role":"data scientist"}}"#,
        );
        let (app, _, owner, resume_id) = setup(gateway).await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/agent/chat",
                Some(owner),
                json!({ "resume_id": resume_id, "message": "What am I missing?" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["agent_decision"], "skill_gap_analysis");
        assert_eq!(body["result"]["type"], "skill_gap");
        assert_eq!(body["result"]["target_role"], "data scientist");
    }

    #[tokio::test]
    async fn test_chat_rejects_unknown_tools() {
        let gateway = ScriptedGateway::replying(r#"{"tool":"apply_changes","args":{}}"#);
        let (app, _, owner, resume_id) = setup(gateway).await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/agent/chat",
                Some(owner),
                json!({ "resume_id": resume_id, "message": "apply it" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    }

    #[tokio::test]
    async fn test_wait_ms_is_bounded_by_the_window() {
        let gateway = crate::testing::GatedGateway::new("1. x");
        let (app, _, owner, resume_id) = setup(gateway.clone()).await;
        send(
            &app,
            post_json(
                "/api/v1/analyses/quantification",
                Some(owner),
                json!({ "resume_id": resume_id, "bullet_points": ["x"] }),
            ),
        )
        .await;

        let started = std::time::Instant::now();
        let uri = format!("/api/v1/analyses/quantification?id={resume_id}&wait_ms=300");
        let (status, body) = send(&app, get(&uri, owner)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "processing");
        assert!(started.elapsed() >= Duration::from_millis(300));
        gateway.release(1);
    }

    #[tokio::test]
    async fn test_malformed_bodies_use_the_error_envelope() {
        let (app, _, owner, _) = setup(ScriptedGateway::failing()).await;

        let request = Request::post("/api/v1/analyses/heatmap")
            .header("content-type", "application/json")
            .header(USER_ID_HEADER, owner.to_string())
            .body(Body::from("{\"resume_id\":"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/agent/chat",
                Some(owner),
                json!({ "resume_id": "not-a-uuid", "message": "hi" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_ats_match_scores_the_owned_resume() {
        let (app, _, owner, resume_id) = setup(ScriptedGateway::failing()).await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/ats-match",
                Some(owner),
                json!({ "resume_id": resume_id, "job_description": "SQL analyst with Kubernetes" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["match_percentage"].is_u64());
        let matched = body["matched_keywords"].as_array().unwrap();
        assert!(matched.iter().any(|k| k["keyword"] == "sql"));
        let missing = body["missing_keywords"].as_array().unwrap();
        assert!(missing.iter().any(|k| k == "kubernetes"));
    }

    #[tokio::test]
    async fn test_ats_match_request_errors() {
        let (app, _, owner, resume_id) = setup(ScriptedGateway::failing()).await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/ats-match",
                Some(owner),
                json!({ "resume_id": resume_id, "job_description": "   " }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, _) = send(
            &app,
            post_json("/api/v1/ats-match", Some(owner), json!({ "job_description": "SQL" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            post_json(
                "/api/v1/ats-match",
                Some(Uuid::new_v4()),
                json!({ "resume_id": resume_id, "job_description": "SQL" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            post_json(
                "/api/v1/ats-match",
                Some(owner),
                json!({ "resume_id": Uuid::new_v4(), "job_description": "SQL" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_chat_context_includes_completed_analyses() {
        let gateway = ScriptedGateway::replying(r#"{"tool":"skill_gap_analysis","args":{}}"#);
        let (app, store, owner, resume_id) = setup(gateway.clone()).await;
        store
            .write_slot(
                resume_id,
                SlotWrite::Completed(AnalysisResult::SkillGap(SkillGapResult {
                    target_role: "data scientist".to_string(),
                    missing_skills: vec!["Pandas".to_string()],
                    target_match: 90,
                })),
            )
            .await
            .unwrap();

        let (status, _) = send(
            &app,
            post_json(
                "/api/v1/agent/chat",
                Some(owner),
                json!({ "resume_id": resume_id, "message": "What next?" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let prompt = &gateway.prompts()[0];
        assert!(prompt.contains("Missing Skills: Pandas"));
        assert!(prompt.contains("Target Match: 90%"));
        assert!(!prompt.contains("Resume Heatmap"));
    }
}
