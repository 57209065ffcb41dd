//! Wire types shared by the submission client and the HTTP backend.
//!
//! `POST /characters` takes a multipart body with the fields below and
//! answers with a [`CharacterResponse`].

use crate::model::CharacterDraft;
use serde::{Deserialize, Serialize};

/// Route segment the backend serves and the client posts to.
pub const CHARACTERS_PATH: &str = "characters";

pub const FIELD_NAME: &str = "name";
pub const FIELD_RACE: &str = "race";
pub const FIELD_CLASS: &str = "class";
pub const FIELD_PORTRAIT: &str = "portrait";

/// File name used for the uploaded portrait and for local export.
pub const PORTRAIT_FILENAME: &str = "character-portrait.png";
pub const PORTRAIT_MIME: &str = "image/png";

/// The text fields of a submission exactly as received. The backend echoes
/// them back without validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub race: String,
    #[serde(default)]
    pub class: String,
}

impl From<&CharacterDraft> for CharacterFields {
    fn from(draft: &CharacterDraft) -> Self {
        Self {
            name: draft.name.clone(),
            race: draft.race_value().to_string(),
            class: draft.class_value().to_string(),
        }
    }
}

/// Metadata about the uploaded portrait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortraitFileInfo {
    pub originalname: String,
    pub mimetype: String,
    pub size: usize,
}

/// Successful answer from `POST /characters`.
///
/// `description` is the only field the client depends on; deserialization
/// fails when it is missing or not a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<CharacterFields>,
    #[serde(default)]
    pub file: Option<PortraitFileInfo>,
    pub description: String,
}

/// Body of every non-2xx answer from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
