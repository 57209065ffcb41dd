//! Default prompt templates for the vision model

/// Instruction sent alongside every portrait
pub const DESCRIBE_PORTRAIT_PROMPT: &str = "Describe the character in this image in detail. Be precise and do not invent any details that are not present in the drawing.";
