//! Portrait Forge backend.
//!
//! Accepts character drafts with a drawn portrait over `POST /characters`,
//! asks a vision model to describe the portrait, and returns the description.

pub mod config;
pub mod generator;
pub mod prompts;
pub mod routes;

pub use config::{ConfigError, GeneratorConfig, ServerConfig};
pub use generator::{DescriptionGenerator, GENERIC_FAILURE, GeneratorError, VisionGenerator};
pub use routes::{AppState, MAX_UPLOAD_BYTES, routes};
