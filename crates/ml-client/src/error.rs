use thiserror::Error;

#[derive(Error, Debug)]
pub enum MLError {
    #[error("Model not loaded")]
    ModelNotLoaded,

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Invalid features: {0}")]
    InvalidFeatures(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type MLResult<T> = Result<T, MLError>;
