// src/error.rs

use thiserror::Error;

/// Errors raised while locating or reading the dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset not found at {location}")]
    NotFound { location: String },

    #[error("unsupported execution environment: {0}")]
    UnsupportedEnvironment(String),

    #[error("file format '{0}' is not supported")]
    UnsupportedFormat(String),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DatasetError {
    pub fn not_found(location: impl ToString) -> Self {
        DatasetError::NotFound {
            location: location.to_string(),
        }
    }
}
