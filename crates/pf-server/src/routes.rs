//! HTTP surface: `POST /characters`.
//!
//! Parses the multipart draft, hands the portrait to the configured
//! [`DescriptionGenerator`], and answers with a [`CharacterResponse`].

use crate::generator::DescriptionGenerator;
use bytes::BufMut;
use futures_util::TryStreamExt;
use pf_core::wire::{
    CHARACTERS_PATH, FIELD_CLASS, FIELD_NAME, FIELD_PORTRAIT, FIELD_RACE, PORTRAIT_FILENAME,
    PORTRAIT_MIME,
};
use pf_core::{CharacterFields, CharacterResponse, ErrorBody, PortraitFileInfo};
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::multipart::{FormData, Part};
use warp::{Filter, Rejection, Reply};

/// Largest accepted request body.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const SAVED_MESSAGE: &str = "Character data received successfully";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    generator: Arc<dyn DescriptionGenerator>,
}

impl AppState {
    pub fn new(generator: Arc<dyn DescriptionGenerator>) -> Self {
        Self { generator }
    }
}

/// The uploaded portrait after MIME resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortraitUpload {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// A parsed submission. Text fields are kept exactly as sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterUpload {
    pub fields: CharacterFields,
    pub portrait: Option<PortraitUpload>,
}

struct ReceivedPart {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// All routes, with CORS, rejection handling, and request logging.
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["POST", "OPTIONS"])
        .allow_headers(vec!["content-type"]);

    characters(state)
        .with(cors)
        .recover(handle_rejection)
        .with(warp::log("pf_server::http"))
}

/// `POST /characters` with a multipart body.
pub fn characters(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path(CHARACTERS_PATH)
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::multipart::form().max_length(MAX_UPLOAD_BYTES))
        .and(with_state(state))
        .and_then(create_character)
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

async fn create_character(
    form: FormData,
    state: AppState,
) -> Result<warp::reply::Response, Rejection> {
    let upload = match read_upload(form).await {
        Ok(upload) => upload,
        Err(e) => {
            log::warn!("rejected malformed multipart body: {e}");
            return Ok(error_reply(StatusCode::BAD_REQUEST, "Malformed multipart body."));
        }
    };

    log::info!("character draft: {:?}", upload.fields);
    let Some(portrait) = upload.portrait else {
        log::warn!("submission without a portrait file");
        return Ok(error_reply(StatusCode::BAD_REQUEST, "Missing portrait file."));
    };
    log::info!(
        "portrait file: {} ({}, {} bytes)",
        portrait.filename,
        portrait.mime,
        portrait.bytes.len()
    );

    match state
        .generator
        .generate_description(&portrait.bytes, &portrait.mime)
        .await
    {
        Ok(description) => {
            log::info!("generated description: {description}");
            let body = CharacterResponse {
                message: SAVED_MESSAGE.to_string(),
                data: Some(upload.fields),
                file: Some(PortraitFileInfo {
                    originalname: portrait.filename,
                    mimetype: portrait.mime,
                    size: portrait.bytes.len(),
                }),
                description,
            };
            Ok(warp::reply::with_status(warp::reply::json(&body), StatusCode::CREATED).into_response())
        }
        Err(e) => {
            log::error!("description generation failed: {e}");
            Ok(error_reply(StatusCode::INTERNAL_SERVER_ERROR, e.public_message()))
        }
    }
}

/// Drain the multipart stream into a [`CharacterUpload`]. Unknown fields
/// are ignored; the first `portrait` part wins.
pub async fn read_upload(form: FormData) -> Result<CharacterUpload, warp::Error> {
    let parts: Vec<ReceivedPart> = form.and_then(read_part).try_collect().await?;

    let mut upload = CharacterUpload::default();
    for part in parts {
        match part.name.as_str() {
            FIELD_NAME => upload.fields.name = text(&part.bytes),
            FIELD_RACE => upload.fields.race = text(&part.bytes),
            FIELD_CLASS => upload.fields.class = text(&part.bytes),
            FIELD_PORTRAIT if upload.portrait.is_none() => {
                let mime = resolve_mime(
                    part.content_type.as_deref(),
                    part.filename.as_deref(),
                    &part.bytes,
                );
                upload.portrait = Some(PortraitUpload {
                    filename: part.filename.unwrap_or_else(|| PORTRAIT_FILENAME.to_string()),
                    mime,
                    bytes: part.bytes,
                });
            }
            other => log::debug!("ignoring multipart field {other:?}"),
        }
    }
    Ok(upload)
}

async fn read_part(part: Part) -> Result<ReceivedPart, warp::Error> {
    let name = part.name().to_string();
    let filename = part.filename().map(str::to_string);
    let content_type = part.content_type().map(str::to_string);
    let bytes = part
        .stream()
        .try_fold(Vec::new(), |mut acc, buf| async move {
            acc.put(buf);
            Ok(acc)
        })
        .await?;
    Ok(ReceivedPart {
        name,
        filename,
        content_type,
        bytes,
    })
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Pick the portrait MIME type: declared content type, then magic bytes,
/// then the file extension, then PNG.
pub fn resolve_mime(declared: Option<&str>, filename: Option<&str>, bytes: &[u8]) -> String {
    if let Some(declared) = declared
        && !declared.is_empty()
        && declared != "application/octet-stream"
    {
        return declared.to_string();
    }
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type().to_string();
    }
    if let Some(mime) = filename.and_then(|f| mime_guess::from_path(f).first()) {
        return mime.essence_str().to_string();
    }
    PORTRAIT_MIME.to_string()
}

fn error_reply(status: StatusCode, message: &str) -> warp::reply::Response {
    let body = ErrorBody {
        error: message.to_string(),
    };
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

async fn handle_rejection(err: Rejection) -> Result<warp::reply::Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found.")
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Upload too large.")
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Content-Length required.")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed.")
    } else {
        log::warn!("unhandled rejection: {err:?}");
        (StatusCode::BAD_REQUEST, "Invalid request.")
    };
    Ok(error_reply(status, message))
}
