//! Integration tests: `POST /characters` through the full filter stack.
//!
//! Bodies are built by hand so each test controls exactly which parts and
//! headers reach the handler. The generator is a recording fake.

use async_trait::async_trait;
use pf_core::{CharacterFields, CharacterResponse, ErrorBody, PortraitFileInfo};
use pf_server::{
    AppState, DescriptionGenerator, GENERIC_FAILURE, GeneratorError, MAX_UPLOAD_BYTES, routes,
};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use warp::http::StatusCode;

const BOUNDARY: &str = "pf-test-boundary";
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDRfake-portrait";

/// Records every call; answers with a fixed description or a failure.
struct FakeGenerator {
    reply: Option<String>,
    calls: Mutex<Vec<(usize, String)>>,
}

impl FakeGenerator {
    fn describing(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(usize, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DescriptionGenerator for FakeGenerator {
    async fn generate_description(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<String, GeneratorError> {
        self.calls
            .lock()
            .unwrap()
            .push((image.len(), mime_type.to_string()));
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(GeneratorError::Status {
                status: 503,
                body: "upstream unavailable".into(),
            }),
        }
    }
}

enum FormPart<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        content_type: Option<&'a str>,
        bytes: &'a [u8],
    },
}

fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            FormPart::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            FormPart::File {
                name,
                filename,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
                    )
                    .as_bytes(),
                );
                if let Some(ct) = content_type {
                    body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
                }
                body.extend_from_slice(b"\r\n");
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn portrait(content_type: Option<&'static str>) -> FormPart<'static> {
    FormPart::File {
        name: "portrait",
        filename: "character-portrait.png",
        content_type,
        bytes: PNG_BYTES,
    }
}

async fn post(state: AppState, parts: &[FormPart<'_>]) -> warp::http::Response<bytes::Bytes> {
    warp::test::request()
        .method("POST")
        .path("/characters")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(multipart_body(parts))
        .reply(&routes(state))
        .await
}

fn error_of(resp: &warp::http::Response<bytes::Bytes>) -> String {
    serde_json::from_slice::<ErrorBody>(resp.body()).unwrap().error
}

// ─── Success ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn valid_submission_returns_description_and_echo() {
    let generator = FakeGenerator::describing("A tall elf in blue robes holding a staff.");
    let resp = post(
        AppState::new(generator.clone()),
        &[
            FormPart::Text("name", "Eldrin"),
            FormPart::Text("race", "elf"),
            FormPart::Text("class", "wizard"),
            portrait(Some("image/png")),
        ],
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: CharacterResponse = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(
        body,
        CharacterResponse {
            message: "Character data received successfully".into(),
            data: Some(CharacterFields {
                name: "Eldrin".into(),
                race: "elf".into(),
                class: "wizard".into(),
            }),
            file: Some(PortraitFileInfo {
                originalname: "character-portrait.png".into(),
                mimetype: "image/png".into(),
                size: PNG_BYTES.len(),
            }),
            description: "A tall elf in blue robes holding a staff.".into(),
        }
    );
    assert_eq!(generator.calls(), vec![(PNG_BYTES.len(), "image/png".to_string())]);
}

#[tokio::test]
async fn empty_fields_are_accepted_unchanged() {
    let generator = FakeGenerator::describing("A stick figure.");
    let resp = post(
        AppState::new(generator.clone()),
        &[
            FormPart::Text("name", ""),
            FormPart::Text("race", ""),
            FormPart::Text("class", ""),
            portrait(Some("image/png")),
        ],
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: CharacterResponse = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(body.data, Some(CharacterFields::default()));
    assert_eq!(body.description, "A stick figure.");
    assert_eq!(generator.calls().len(), 1);
}

#[tokio::test]
async fn unknown_fields_are_ignored() {
    let generator = FakeGenerator::describing("ok");
    let resp = post(
        AppState::new(generator),
        &[
            FormPart::Text("name", "Brakka"),
            FormPart::Text("alignment", "chaotic"),
            portrait(Some("image/png")),
        ],
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: CharacterResponse = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(body.data.unwrap().name, "Brakka");
}

#[tokio::test]
async fn octet_stream_portrait_is_sniffed() {
    let generator = FakeGenerator::describing("ok");
    let resp = post(
        AppState::new(generator.clone()),
        &[portrait(Some("application/octet-stream"))],
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(generator.calls()[0].1, "image/png");
}

// ─── Failures ────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_portrait_is_rejected_without_generating() {
    let generator = FakeGenerator::describing("never");
    let resp = post(
        AppState::new(generator.clone()),
        &[
            FormPart::Text("name", "Eldrin"),
            FormPart::Text("race", "elf"),
            FormPart::Text("class", "wizard"),
        ],
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&resp), "Missing portrait file.");
    assert!(generator.calls().is_empty());
}

#[tokio::test]
async fn generator_failure_is_reported_generically() {
    let generator = FakeGenerator::failing();
    let resp = post(
        AppState::new(generator.clone()),
        &[FormPart::Text("name", "Eldrin"), portrait(Some("image/png"))],
    )
    .await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_of(&resp), GENERIC_FAILURE);
    assert!(!String::from_utf8_lossy(resp.body()).contains("upstream unavailable"));
    assert_eq!(generator.calls().len(), 1);
}

#[tokio::test]
async fn oversized_upload_is_rejected_without_generating() {
    let generator = FakeGenerator::describing("never");
    let huge = vec![0u8; MAX_UPLOAD_BYTES as usize + 1];
    let resp = post(
        AppState::new(generator.clone()),
        &[
            FormPart::Text("name", "Eldrin"),
            FormPart::File {
                name: "portrait",
                filename: "character-portrait.png",
                content_type: Some("image/png"),
                bytes: &huge,
            },
        ],
    )
    .await;

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error_of(&resp), "Upload too large.");
    assert!(generator.calls().is_empty());
}

#[tokio::test]
async fn non_multipart_body_is_a_bad_request() {
    let resp = warp::test::request()
        .method("POST")
        .path("/characters")
        .header("content-type", "application/json")
        .body(r#"{"name":"Eldrin"}"#)
        .reply(&routes(AppState::new(FakeGenerator::describing("x"))))
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_method_and_path() {
    let filter = routes(AppState::new(FakeGenerator::describing("x")));

    let resp = warp::test::request()
        .method("GET")
        .path("/characters")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let resp = warp::test::request()
        .method("POST")
        .path("/monsters")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ─── CORS ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn preflight_from_any_origin_is_allowed() {
    let resp = warp::test::request()
        .method("OPTIONS")
        .path("/characters")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .reply(&routes(AppState::new(FakeGenerator::describing("x"))))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("access-control-allow-origin"));
}
