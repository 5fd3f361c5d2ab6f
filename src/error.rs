use thiserror::Error;

#[derive(Error, Debug)]
pub enum FarmOpsError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Profile parsing error: {0}")]
    Profile(#[from] serde_yaml::Error),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, FarmOpsError>;
