use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field '{0}' is empty")]
    EmptyField(&'static str),

    #[error("no {0} returned")]
    EmptyList(&'static str),
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("No API key configured (set STUDY_LENS_API_KEY or GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("Could not reach the AI service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("AI service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("AI service returned an empty response")]
    EmptyResponse,

    #[error("AI response did not match the expected format: {0}")]
    Decode(#[from] DecodeError),
}

impl ServiceError {
    /// Short message suitable for inline display next to the submit button.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::MissingApiKey => {
                "The AI service is not configured. Add an API key and try again.".to_string()
            }
            ServiceError::Transport(_) => {
                "Could not reach the AI service. Check your connection and try again.".to_string()
            }
            ServiceError::Status { status, .. } if *status == 429 => {
                "The AI service is busy right now. Please wait a moment and retry.".to_string()
            }
            ServiceError::Status { status, .. } => {
                format!("The AI service rejected the request (HTTP {status}).")
            }
            ServiceError::EmptyResponse | ServiceError::Decode(_) => {
                "The AI returned an unexpected answer. Please try again.".to_string()
            }
        }
    }
}
