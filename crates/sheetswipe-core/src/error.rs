use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid sheet geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid gesture trace: {0}")]
    InvalidTrace(String),
}

pub type Result<T> = std::result::Result<T, Error>;
