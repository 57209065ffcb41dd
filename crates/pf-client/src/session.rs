//! One character-creation session: draft, drawing surface, last result.

use crate::submit::{SubmitError, Submitter};
use pf_core::CharacterDraft;
use pf_editor::{DrawingSurface, SurfaceConfig};

/// Shown after a successful save.
pub const SAVED_MESSAGE: &str = "Character saved successfully!";

/// What happened when the user pressed save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A description came back and replaced the previous one.
    Saved,
    /// The attempt failed; carries the generic message to show.
    Failed(&'static str),
    /// A submission was already in flight, so saving was not offered.
    NotOffered,
}

impl SaveOutcome {
    /// Text to show the user, if any.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            SaveOutcome::Saved => Some(SAVED_MESSAGE),
            SaveOutcome::Failed(message) => Some(*message),
            SaveOutcome::NotOffered => None,
        }
    }
}

pub struct CharacterSession {
    pub draft: CharacterDraft,
    pub surface: DrawingSurface,
    description: Option<String>,
}

impl CharacterSession {
    pub fn new(config: SurfaceConfig) -> Result<Self, String> {
        Ok(Self {
            draft: CharacterDraft::default(),
            surface: DrawingSurface::new(config)?,
            description: None,
        })
    }

    /// The last generated description, if any save succeeded.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Submit the draft and current canvas. On success the description is
    /// overwritten; on failure it is left as it was.
    pub async fn save(&mut self, submitter: &Submitter) -> SaveOutcome {
        if submitter.is_saving() {
            return SaveOutcome::NotOffered;
        }
        match submitter.submit_surface(&self.draft, &self.surface).await {
            Ok(response) => {
                self.description = Some(response.description);
                SaveOutcome::Saved
            }
            Err(SubmitError::InFlight) => SaveOutcome::NotOffered,
            Err(e) => {
                log::warn!("save failed: {e}");
                SaveOutcome::Failed(e.user_message())
            }
        }
    }
}
