//! HTTP collaborator clients against a local stand-in for Gemini and Pinecone.

use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use traction_brain::core::errors::ApiError;
use traction_brain::embeddings::{EmbeddingClient, GeminiEmbeddings};
use traction_brain::llm::{ChatMessage, ChatModel, GeminiChat};
use traction_brain::vector::{PineconeIndex, VectorIndex, VectorRecord};

struct Captured {
    path: String,
    headers: HeaderMap,
    body: Value,
}

/// Answers every request with one canned status and body, recording what it received.
struct Upstream {
    status: StatusCode,
    reply: Value,
    requests: Mutex<Vec<Captured>>,
}

impl Upstream {
    async fn start(status: StatusCode, reply: Value) -> (String, Arc<Self>) {
        let upstream = Arc::new(Self {
            status,
            reply,
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .fallback(capture)
            .with_state(upstream.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), upstream)
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

async fn capture(
    State(upstream): State<Arc<Upstream>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    upstream.requests.lock().unwrap().push(Captured {
        path: uri.path().to_string(),
        headers,
        body,
    });
    (upstream.status, Json(upstream.reply.clone()))
}

fn embeddings(base_url: &str) -> GeminiEmbeddings {
    GeminiEmbeddings::new(reqwest::Client::new(), "g-key", "text-embedding-004")
        .with_base_url(base_url)
}

fn chat(base_url: &str) -> GeminiChat {
    GeminiChat::new(reqwest::Client::new(), "g-key", "gemini-1.5-pro", 0.3).with_base_url(base_url)
}

#[tokio::test]
async fn batch_embed_sends_document_task_type() {
    let (url, upstream) = Upstream::start(
        StatusCode::OK,
        json!({ "embeddings": [{ "values": [0.1, 0.2] }, { "values": [0.3, 0.4] }] }),
    )
    .await;

    let vectors = embeddings(&url)
        .embed_many(&["first".to_string(), "second".to_string()])
        .await
        .unwrap();
    assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);

    let requests = upstream.requests.lock().unwrap();
    assert_eq!(
        requests[0].path,
        "/models/text-embedding-004:batchEmbedContents"
    );
    assert_eq!(requests[0].headers["x-goog-api-key"], "g-key");
    let sent = requests[0].body["requests"].as_array().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1]["taskType"], "RETRIEVAL_DOCUMENT");
    assert_eq!(sent[1]["content"]["parts"][0]["text"], "second");
}

#[tokio::test]
async fn batch_embed_count_mismatch_is_upstream_error() {
    let (url, _upstream) = Upstream::start(
        StatusCode::OK,
        json!({ "embeddings": [{ "values": [0.1, 0.2] }] }),
    )
    .await;

    let err = embeddings(&url)
        .embed_many(&["first".to_string(), "second".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Upstream(_)));
}

#[tokio::test]
async fn embed_one_uses_query_task_type() {
    let (url, upstream) =
        Upstream::start(StatusCode::OK, json!({ "embedding": { "values": [0.5, 0.25] } })).await;

    let vector = embeddings(&url).embed_one("what now?").await.unwrap();
    assert_eq!(vector, vec![0.5, 0.25]);

    let requests = upstream.requests.lock().unwrap();
    assert_eq!(requests[0].path, "/models/text-embedding-004:embedContent");
    assert_eq!(requests[0].body["taskType"], "RETRIEVAL_QUERY");
}

#[tokio::test]
async fn gemini_server_errors_are_upstream_errors() {
    let (url, _upstream) = Upstream::start(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": { "message": "backend unavailable" } }),
    )
    .await;

    let err = embeddings(&url).embed_one("q").await.unwrap_err();
    assert!(matches!(err, ApiError::Upstream(ref msg) if msg.contains("500")));

    let err = embeddings(&url)
        .embed_many(&["doc".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Upstream(_)));

    let err = chat(&url)
        .invoke(&[ChatMessage::user("hello")])
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Upstream(_)));
}

#[tokio::test]
async fn chat_returns_candidate_text() {
    let (url, upstream) = Upstream::start(
        StatusCode::OK,
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "{\"items\":" }, { "text": "[]}" }] }
            }]
        }),
    )
    .await;

    let text = chat(&url)
        .invoke(&[ChatMessage::system("coach"), ChatMessage::user("plan my day")])
        .await
        .unwrap();
    assert_eq!(text, r#"{"items":[]}"#);

    let requests = upstream.requests.lock().unwrap();
    assert_eq!(requests[0].path, "/models/gemini-1.5-pro:generateContent");
    assert_eq!(
        requests[0].body["systemInstruction"]["parts"][0]["text"],
        "coach"
    );
}

#[tokio::test]
async fn blocked_chat_prompt_is_upstream_error() {
    let (url, _upstream) = Upstream::start(
        StatusCode::OK,
        json!({ "promptFeedback": { "blockReason": "SAFETY" } }),
    )
    .await;

    let err = chat(&url)
        .invoke(&[ChatMessage::user("hello")])
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Upstream(ref msg) if msg.contains("SAFETY")));
}

#[tokio::test]
async fn pinecone_query_sends_filter_and_reads_matches() {
    let (url, upstream) = Upstream::start(
        StatusCode::OK,
        json!({ "matches": [{ "id": "a1", "score": 0.87, "metadata": { "item_id": "a1" } }] }),
    )
    .await;
    let index = PineconeIndex::new(reqwest::Client::new(), "p-key", &url);

    let filter = json!({ "user_id": "u1", "status": "open" });
    let matches = index.query(&[0.1, 0.2], 20, Some(&filter)).await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, "a1");
    assert_eq!(matches[0].score, Some(0.87));

    let requests = upstream.requests.lock().unwrap();
    assert_eq!(requests[0].path, "/query");
    assert_eq!(requests[0].headers["api-key"], "p-key");
    assert!(requests[0].headers.contains_key("x-pinecone-api-version"));
    assert_eq!(requests[0].body["topK"], 20);
    assert_eq!(requests[0].body["includeMetadata"], true);
    assert_eq!(requests[0].body["filter"], filter);
}

#[tokio::test]
async fn pinecone_server_errors_are_upstream_errors() {
    let (url, _upstream) =
        Upstream::start(StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": "down" })).await;
    let index = PineconeIndex::new(reqwest::Client::new(), "p-key", &url);

    let record = VectorRecord {
        id: "a1".to_string(),
        values: vec![0.1],
        metadata: Default::default(),
    };
    let err = index.upsert(vec![record]).await.unwrap_err();
    assert!(matches!(err, ApiError::Upstream(ref msg) if msg.contains("/vectors/upsert")));

    let err = index.query(&[0.1], 5, None).await.unwrap_err();
    assert!(matches!(err, ApiError::Upstream(_)));
}

#[tokio::test]
async fn connect_resolves_host_from_control_plane() {
    let (data_url, data_plane) = Upstream::start(StatusCode::OK, json!({})).await;
    let (control_url, control_plane) =
        Upstream::start(StatusCode::OK, json!({ "name": "traction", "host": data_url })).await;

    let index = PineconeIndex::connect_via(
        &control_url,
        reqwest::Client::new(),
        "p-key",
        "traction",
        None,
    )
    .await
    .unwrap();
    assert_eq!(index.host(), data_url);

    {
        let requests = control_plane.requests.lock().unwrap();
        assert_eq!(requests[0].path, "/indexes/traction");
        assert_eq!(requests[0].headers["api-key"], "p-key");
    }

    index.delete(&["a1".to_string()]).await.unwrap();
    let requests = data_plane.requests.lock().unwrap();
    assert_eq!(requests[0].path, "/vectors/delete");
    assert_eq!(requests[0].body["ids"], json!(["a1"]));
}

#[tokio::test]
async fn configured_host_skips_control_plane() {
    let (control_url, control_plane) = Upstream::start(StatusCode::OK, json!({})).await;

    let index = PineconeIndex::connect_via(
        &control_url,
        reqwest::Client::new(),
        "p-key",
        "traction",
        Some("traction-abc.svc.pinecone.io"),
    )
    .await
    .unwrap();
    assert_eq!(index.host(), "https://traction-abc.svc.pinecone.io");
    assert_eq!(control_plane.request_count(), 0);
}

#[tokio::test]
async fn unknown_index_is_upstream_error() {
    let (control_url, _control_plane) =
        Upstream::start(StatusCode::NOT_FOUND, json!({ "error": "not found" })).await;

    let result = PineconeIndex::connect_via(
        &control_url,
        reqwest::Client::new(),
        "p-key",
        "missing",
        None,
    )
    .await;
    assert!(matches!(result, Err(ApiError::Upstream(ref msg)) if msg.contains("missing")));
}
