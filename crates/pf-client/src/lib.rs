pub mod session;
pub mod submit;

pub use session::{CharacterSession, SAVED_MESSAGE, SaveOutcome};
pub use submit::{SubmitConfig, SubmitError, Submitter};
