use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Malformed period {period}: {reason}")]
    MalformedPeriod { period: String, reason: String },

    #[error("Degenerate score for period {0}")]
    DegenerateScore(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl AnalysisError {
    pub fn malformed(period: impl Into<String>, reason: impl Into<String>) -> Self {
        AnalysisError::MalformedPeriod {
            period: period.into(),
            reason: reason.into(),
        }
    }
}
