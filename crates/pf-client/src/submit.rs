//! Multipart submission of a character draft and its portrait.

use pf_core::wire::{
    CHARACTERS_PATH, FIELD_CLASS, FIELD_NAME, FIELD_PORTRAIT, FIELD_RACE, PORTRAIT_FILENAME,
    PORTRAIT_MIME,
};
use pf_core::{CharacterDraft, CharacterResponse};
use pf_editor::DrawingSurface;
use reqwest::multipart::{Form, Part};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Where and how long to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitConfig {
    /// Full URL of the characters endpoint.
    pub endpoint: String,
    /// Upper bound for the whole request, upload through response body.
    pub timeout: Duration,
}

impl SubmitConfig {
    /// Build a config that posts to `<base_url>/characters`.
    pub fn for_base_url(base_url: &str) -> Self {
        Self {
            endpoint: format!("{}/{}", base_url.trim_end_matches('/'), CHARACTERS_PATH),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self::for_base_url(DEFAULT_BASE_URL)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("a submission is already in flight")]
    InFlight,
    #[error("failed to encode portrait: {0}")]
    Encode(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("could not reach {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl SubmitError {
    /// Generic text shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            SubmitError::Timeout(_) | SubmitError::Transport { .. } => {
                "Error: Could not connect to the server."
            }
            _ => "Error: Failed to save character.",
        }
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, SubmitError::Timeout(_) | SubmitError::Transport { .. })
    }
}

/// Sends drafts to the backend, one at a time.
pub struct Submitter {
    client: reqwest::Client,
    config: SubmitConfig,
    saving: AtomicBool,
}

impl Submitter {
    pub fn new(config: SubmitConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            saving: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &SubmitConfig {
        &self.config
    }

    /// True while a submission is in flight.
    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Export the surface as PNG and submit it with the draft.
    pub async fn submit_surface(
        &self,
        draft: &CharacterDraft,
        surface: &DrawingSurface,
    ) -> Result<CharacterResponse, SubmitError> {
        let png = surface.export_png().map_err(SubmitError::Encode)?;
        self.submit(draft, png).await
    }

    /// POST the draft fields and the PNG portrait as one multipart body.
    ///
    /// Exactly one attempt; fails with [`SubmitError::InFlight`] if another
    /// submission holds the saving flag.
    pub async fn submit(
        &self,
        draft: &CharacterDraft,
        portrait_png: Vec<u8>,
    ) -> Result<CharacterResponse, SubmitError> {
        let _saving = SavingGuard::acquire(&self.saving).ok_or(SubmitError::InFlight)?;

        let size = portrait_png.len();
        let portrait = Part::bytes(portrait_png)
            .file_name(PORTRAIT_FILENAME)
            .mime_str(PORTRAIT_MIME)
            .map_err(|e| SubmitError::Encode(e.to_string()))?;
        let form = Form::new()
            .text(FIELD_NAME, draft.name.clone())
            .text(FIELD_RACE, draft.race_value())
            .text(FIELD_CLASS, draft.class_value())
            .part(FIELD_PORTRAIT, portrait);

        log::info!(
            "submitting character {:?} ({} byte portrait) to {}",
            draft.name,
            size,
            self.config.endpoint
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            log::error!("failed to save character: {status} {body}");
            return Err(SubmitError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CharacterResponse = serde_json::from_slice(&body).map_err(|e| {
            log::error!("unexpected response from {}: {e}", self.config.endpoint);
            SubmitError::MalformedResponse(e.to_string())
        })?;
        log::debug!("character saved: {}", parsed.message);
        Ok(parsed)
    }

    fn transport_error(&self, e: reqwest::Error) -> SubmitError {
        if e.is_timeout() {
            log::error!("request to {} timed out", self.config.endpoint);
            SubmitError::Timeout(self.config.timeout)
        } else {
            log::error!("error submitting form: {e}");
            SubmitError::Transport {
                endpoint: self.config.endpoint.clone(),
                source: e,
            }
        }
    }
}

/// Holds the saving flag for the lifetime of one submission.
struct SavingGuard<'a>(&'a AtomicBool);

impl<'a> SavingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
