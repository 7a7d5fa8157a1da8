use thiserror::Error;

#[derive(Debug, Error)]
pub enum LboError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("State error: {0}")]
    State(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LboError {
    fn from(e: serde_json::Error) -> Self {
        LboError::SerializationError(e.to_string())
    }
}
