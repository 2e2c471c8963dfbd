use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalesInsightsError {
    #[error("Invalid configuration for '{field}': {details}")]
    InvalidConfig { field: String, details: String },

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Monthly aggregate violation in {month}: {details}")]
    AggregateViolation { month: String, details: String },

    #[error("Failed to fetch sales feed: {0}")]
    Fetch(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SalesInsightsError>;
