use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("answer for question {question_id} already recorded in session {session_id}")]
    DuplicateAnswer {
        session_id: String,
        question_id: String,
    },

    #[error("risk classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    #[error("model training failed: {0}")]
    Training(String),

    #[error("model io error: {0}")]
    ModelIo(#[from] std::io::Error),

    #[error("model format error: {0}")]
    ModelFormat(#[from] serde_json::Error),

    #[error("session store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, ScreeningError>;

impl ScreeningError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(session_id: impl Into<String>) -> Self {
        Self::SessionNotFound(session_id.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SessionNotFound(_))
    }
}
