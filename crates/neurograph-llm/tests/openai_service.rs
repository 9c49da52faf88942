//! Tests for `OpenAiService` against a local mock completions endpoint.
//!
//! Run with: `cargo test --package neurograph-llm --test openai_service`

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use neurograph_core::{ChatMessage, Graph, GraphNode, GraphUpdate};
use neurograph_llm::{
    AnalysisRequest, ChatRequest, LlmResolver, ModelService, OpenAiService, ServiceError,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

type Captured = Arc<Mutex<Vec<Value>>>;

/// Serve `router` on an ephemeral port and return its base API URL.
async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/v1")
}

/// Mock endpoint that always answers with `content` and records request bodies.
async fn completion_server(content: &'static str) -> (String, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let router = Router::new()
        .route(
            "/v1/chat/completions",
            post(
                move |State(seen): State<Captured>, Json(body): Json<Value>| async move {
                    seen.lock().unwrap().push(body);
                    Json(json!({"choices": [{"message": {"role": "assistant", "content": content}}]}))
                },
            ),
        )
        .with_state(captured.clone());
    (spawn(router).await, captured)
}

fn service(url: String) -> OpenAiService {
    OpenAiService::new(LlmResolver::new(url, "test-key", "test-model")).unwrap()
}

#[tokio::test]
async fn analyze_returns_graph_verbatim() {
    let (url, captured) = completion_server(
        r#"{"nodes":[{"id":"n1","label":"Conv","type":"conv"}],"edges":[]}"#,
    )
    .await;

    let graph = service(url)
        .analyze(&AnalysisRequest::new("class Net: ..."))
        .await
        .unwrap();

    assert_eq!(
        graph,
        Graph::new(vec![GraphNode::new("n1", "Conv", "conv")], vec![])
    );

    let bodies = captured.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["model"], "test-model");
    assert_eq!(bodies[0]["messages"][0]["role"], "system");
    assert!(bodies[0]["messages"][1]["content"]
        .as_str()
        .unwrap()
        .contains("class Net: ..."));
}

#[tokio::test]
async fn chat_sends_history_and_parses_update() {
    let (url, captured) = completion_server(
        "```json\n{\"answer\":\"Removed.\",\"updatedGraph\":{\"nodes\":[],\"edges\":[]}}\n```",
    )
    .await;

    let request = ChatRequest {
        message: "remove n1".into(),
        code: "class Net: ...".into(),
        graph: Some(Graph::new(vec![GraphNode::new("n1", "Conv", "conv")], vec![])),
        history: vec![ChatMessage::user("what is n1?"), ChatMessage::model("A conv layer.")],
        files: vec![],
    };
    let response = service(url).chat(&request).await.unwrap();

    assert_eq!(response.answer, "Removed.");
    assert_eq!(response.updated_graph, GraphUpdate::Replace(Graph::empty()));

    let bodies = captured.lock().unwrap();
    let messages = bodies[0]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[1]["role"], "user");
    assert_eq!(messages[2]["role"], "assistant");
    assert!(messages[3]["content"].as_str().unwrap().contains("remove n1"));
}

#[tokio::test]
async fn non_json_completion_is_malformed() {
    let (url, _) = completion_server("I think this is a CNN.").await;
    let err = service(url)
        .analyze(&AnalysisRequest::new("x = 1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Malformed(_)), "{err:?}");
}

#[tokio::test]
async fn rate_limit_status_is_classified() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
    );
    let url = spawn(router).await;

    let err = service(url)
        .analyze(&AnalysisRequest::new("x = 1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::RateLimited));
    assert!(err.is_transient());
}

#[tokio::test]
async fn server_error_keeps_status_and_body() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
    );
    let url = spawn(router).await;

    let err = service(url)
        .analyze(&AnalysisRequest::new("x = 1"))
        .await
        .unwrap_err();
    match err {
        ServiceError::Http { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "bad key");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn long_multibyte_error_body_is_clipped() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{}错误", "a".repeat(511)),
            )
        }),
    );
    let url = spawn(router).await;

    let err = service(url)
        .analyze(&AnalysisRequest::new("x = 1"))
        .await
        .unwrap_err();
    match err {
        ServiceError::Http { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "a".repeat(511));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_choices_is_empty_completion() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(json!({"choices": []})) }),
    );
    let url = spawn(router).await;

    let err = service(url)
        .analyze(&AnalysisRequest::new("x = 1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::EmptyCompletion));
}

#[tokio::test]
async fn slow_service_times_out() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"choices": []}))
        }),
    );
    let url = spawn(router).await;

    let service = OpenAiService::with_timeout(
        LlmResolver::new(url, "", "test-model"),
        Duration::from_millis(200),
    )
    .unwrap();
    let err = service
        .analyze(&AnalysisRequest::new("x = 1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Timeout { .. }), "{err:?}");
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    // Port 9 (discard) is closed on test machines.
    let err = service("http://127.0.0.1:9/v1".into())
        .analyze(&AnalysisRequest::new("x = 1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Transport(_)), "{err:?}");
}
