//! Error types for querybar I/O boundaries.
//!
//! The tokenizer and editor state machine never fail; these errors come
//! from configuration, recent-key persistence and suggestion providers.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Suggestion provider error: {0}")]
    Suggestion(String),
}

pub type Result<T> = std::result::Result<T, Error>;
