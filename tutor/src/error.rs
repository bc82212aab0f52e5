use mentoria_core::GeminiError;
use thiserror::Error;

use crate::validation::ValidationError;

/// Failures of a single tutor operation. None of them is fatal to the process.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TutorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    ModelUnavailable(String),

    #[error("Could not generate the quiz in the expected format: {0}")]
    QuizFormat(String),

    #[error("Generated quiz is invalid: {0}")]
    QuizSchema(String),

    #[error("Chat session not found: {0}")]
    SessionNotFound(String),
}

impl From<GeminiError> for TutorError {
    fn from(e: GeminiError) -> Self {
        TutorError::ModelUnavailable(e.to_string())
    }
}

impl TutorError {
    /// Whether the caller, not the model or the network, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, TutorError::Validation(_))
    }
}

pub type TutorResult<T> = Result<T, TutorError>;
