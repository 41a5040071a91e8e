//! Error types for the fts-tour walkthroughs.
//!
//! Every fallible step of a walkthrough returns [`TourError`] so the binary can
//! report a failure instead of aborting halfway through the narration.

use thiserror::Error;

/// Main error type for the fts-tour library.
#[derive(Debug, Error)]
pub enum TourError {
    // Database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    #[error("Full-text index {table} is missing")]
    IndexMissing { table: String },

    // Sample data errors
    #[error("Sample data error: {message}")]
    SampleData {
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    // Output errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    // Document database errors
    #[cfg(feature = "mongo")]
    #[error("MongoDB error: {message}")]
    Mongo {
        message: String,
        #[source]
        source: Option<Box<mongodb::error::Error>>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },
}

/// Result type alias for fts-tour operations.
pub type Result<T> = std::result::Result<T, TourError>;

impl From<rusqlite::Error> for TourError {
    fn from(err: rusqlite::Error) -> Self {
        TourError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<csv::Error> for TourError {
    fn from(err: csv::Error) -> Self {
        TourError::SampleData {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<std::io::Error> for TourError {
    fn from(err: std::io::Error) -> Self {
        TourError::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

#[cfg(feature = "mongo")]
impl From<mongodb::error::Error> for TourError {
    fn from(err: mongodb::error::Error) -> Self {
        TourError::Mongo {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl TourError {
    /// Create a validation error for a named input.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        TourError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Check if the full-text engine rejected the MATCH expression itself.
    ///
    /// SQLite reports these as a generic SQL error, so the message is the only
    /// thing that tells them apart from other database failures.
    pub fn is_query_syntax(&self) -> bool {
        match self {
            TourError::Database { message, .. } => {
                message.contains("malformed MATCH expression")
            }
            TourError::Validation { field, .. } => field == "query",
            _ => false,
        }
    }
}
