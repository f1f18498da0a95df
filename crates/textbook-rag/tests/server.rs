//! HTTP router tests driven through `tower::ServiceExt::oneshot`

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{agent, passage, FakeLlm, FakeRetriever};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use textbook_rag::config::RagConfig;
use textbook_rag::server::state::AppState;
use textbook_rag::server::RagServer;
use textbook_rag::RawChunk;
use tower::ServiceExt;

fn router(retriever: Arc<FakeRetriever>, llm: Arc<FakeLlm>) -> Router {
    let state = AppState::with_agent(RagConfig::default(), agent(retriever, llm));
    RagServer::with_state(state).build_router()
}

fn healthy_router() -> Router {
    router(
        FakeRetriever::with_chunks(vec![RawChunk::new(
            passage("ROS 2"),
            "https://book.example/ros2",
            0,
            0.82,
        )]),
        FakeLlm::answering("ROS 2 is a robotics middleware."),
    )
}

fn post_query(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn query_returns_answer_with_sources() {
    let response = healthy_router()
        .oneshot(post_query(json!({ "question": "What is ROS 2?" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["answer"], "ROS 2 is a robotics middleware.");
    assert_eq!(body["sources"], json!(["https://book.example/ros2"]));
    assert_eq!(body["confidence"], "high");
    assert_eq!(body["matched_chunks"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn pipeline_failure_is_reported_in_body() {
    let app = router(
        FakeRetriever::failing("qdrant unreachable"),
        FakeLlm::answering("unused"),
    );

    let response = app
        .oneshot(post_query(json!({ "question": "What is ROS 2?" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["sources"], json!([]));
    assert_eq!(body["matched_chunks"], json!([]));
    assert!(body["error"]
        .as_str()
        .is_some_and(|e| e.contains("qdrant unreachable")));
}

#[tokio::test]
async fn blank_question_is_rejected() {
    let response = healthy_router()
        .oneshot(post_query(json!({ "question": "   " })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "invalid_request");
}

#[tokio::test]
async fn missing_question_field_is_rejected() {
    let response = healthy_router()
        .oneshot(post_query(json!({ "query": "What is ROS 2?" })))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn health_is_always_ok() {
    let response = healthy_router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn ready_reports_collaborator_health() {
    let response = healthy_router()
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["retriever"]["healthy"], true);
    assert_eq!(body["llm"]["name"], "fake-llm");
}

#[tokio::test]
async fn ready_is_unavailable_when_a_collaborator_is_down() {
    let app = router(
        FakeRetriever::with_chunks(Vec::new()),
        FakeLlm::failing("model not loaded"),
    );

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["llm"]["healthy"], false);
}

#[tokio::test]
async fn info_describes_policy() {
    let response = healthy_router()
        .oneshot(Request::builder().uri("/api/info").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["name"], "textbook-rag");
    assert_eq!(body["llm"]["model"], "fake-model");
    assert_eq!(body["policy"]["top_k"], 5);
    assert_eq!(body["policy"]["max_chunks"], 3);
}
