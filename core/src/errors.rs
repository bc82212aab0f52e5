use thiserror::Error;

/// Gemini API errors
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Gemini API is not configured. Set GEMINI_API_KEY in the environment or .env file")]
    MissingCredentials,

    #[error("Request Error: {0}")]
    RequestError(String),

    #[error("HTTP Error: {status_code} - {message}")]
    HttpError { status_code: u16, message: String },

    #[error("Response Error: {0}")]
    ResponseError(String),

    #[error("Content blocked by safety filters: {0}")]
    SafetyBlocked(String),

    #[error("Parsing Error: {0}")]
    ParsingError(String),

    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl GeminiError {
    /// Whether a failed call is worth repeating.
    ///
    /// Transport failures, rate limiting and server-side errors are transient. Safety
    /// blocks, missing credentials and malformed payloads will fail the same way again.
    pub fn is_transient(&self) -> bool {
        match self {
            GeminiError::RequestError(_) => true,
            GeminiError::HttpError { status_code, .. } => {
                *status_code == 429 || (500..600).contains(status_code)
            }
            _ => false,
        }
    }
}

/// Result type for Gemini operations
pub type GeminiResult<T> = Result<T, GeminiError>;
