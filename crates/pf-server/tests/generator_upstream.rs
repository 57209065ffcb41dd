//! Integration tests: `VisionGenerator` against an in-process upstream.
//!
//! A small warp server stands in for the chat-completions API and records
//! what it receives.

use pf_server::{DescriptionGenerator, GeneratorConfig, GeneratorError, VisionGenerator};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use warp::Filter;
use warp::http::StatusCode;

#[derive(Debug, Clone)]
struct Received {
    authorization: Option<String>,
    body: Value,
}

type Log = Arc<Mutex<Vec<Received>>>;

/// Serve a fixed status and body on `/v1/chat/completions`.
fn spawn_upstream(status: StatusCode, reply: &'static str) -> (SocketAddr, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let seen = log.clone();
    let route = warp::path!("v1" / "chat" / "completions")
        .and(warp::post())
        .and(warp::header::optional::<String>("authorization"))
        .and(warp::body::json())
        .map(move |authorization: Option<String>, body: Value| {
            seen.lock().unwrap().push(Received {
                authorization,
                body,
            });
            warp::http::Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(reply)
                .unwrap()
        });
    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    (addr, log)
}

fn generator_for(addr: SocketAddr, api_key: &str) -> VisionGenerator {
    let mut config = GeneratorConfig::new(api_key);
    config.api_url = format!("http://{addr}/v1/chat/completions");
    config.model = "test-vision".into();
    config.max_tokens = 64;
    config.timeout = Duration::from_secs(5);
    VisionGenerator::new(config).unwrap()
}

#[tokio::test]
async fn sends_prompt_image_and_bearer_key() {
    let (addr, log) = spawn_upstream(
        StatusCode::OK,
        r#"{"choices":[{"message":{"role":"assistant","content":"A dwarf with a red beard."}}]}"#,
    );
    let generator = generator_for(addr, "gsk_test");

    let description = generator
        .generate_description(b"abc", "image/png")
        .await
        .unwrap();
    assert_eq!(description, "A dwarf with a red beard.");

    let received = log.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].authorization.as_deref(), Some("Bearer gsk_test"));

    let body = &received[0].body;
    assert_eq!(body["model"], json!("test-vision"));
    assert_eq!(body["max_tokens"], json!(64));
    let content = &body["messages"][0]["content"];
    assert_eq!(body["messages"][0]["role"], json!("user"));
    assert_eq!(content[0]["type"], json!("text"));
    assert_eq!(
        content[1]["image_url"]["url"],
        json!("data:image/png;base64,YWJj")
    );
}

#[tokio::test]
async fn upstream_error_status_is_surfaced() {
    let (addr, _log) = spawn_upstream(
        StatusCode::TOO_MANY_REQUESTS,
        r#"{"error":{"message":"rate limited"}}"#,
    );
    let err = generator_for(addr, "gsk_test")
        .generate_description(b"abc", "image/png")
        .await
        .unwrap_err();

    match err {
        GeneratorError::Status { status, body } => {
            assert_eq!(status, 429);
            assert!(body.contains("rate limited"));
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn response_without_content_is_malformed() {
    let (addr, _log) = spawn_upstream(StatusCode::OK, r#"{"choices":[]}"#);
    let err = generator_for(addr, "gsk_test")
        .generate_description(b"abc", "image/jpeg")
        .await
        .unwrap_err();
    assert!(matches!(err, GeneratorError::Malformed(_)));
}

#[tokio::test]
async fn missing_key_never_reaches_upstream() {
    let (addr, log) = spawn_upstream(StatusCode::OK, r#"{"choices":[]}"#);
    let err = generator_for(addr, "")
        .generate_description(b"abc", "image/png")
        .await
        .unwrap_err();

    assert!(matches!(err, GeneratorError::MissingApiKey));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_upstream_is_a_request_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let err = generator_for(addr, "gsk_test")
        .generate_description(b"abc", "image/png")
        .await
        .unwrap_err();
    assert!(matches!(err, GeneratorError::Request(_)));
}

#[tokio::test]
async fn truncated_upstream_body_is_a_request_error() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Promises 100 bytes, sends 3, then hangs up.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = vec![0u8; 64 * 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"c")
                .await;
            let _ = socket.shutdown().await;
        }
    });

    let err = generator_for(addr, "gsk_test")
        .generate_description(b"abc", "image/png")
        .await
        .unwrap_err();
    assert!(matches!(err, GeneratorError::Request(_)));
}
