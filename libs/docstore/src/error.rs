//! Error types for document store operations
//!
//! Every backend reports failures through [`StoreError`]. A missing document on
//! `get` is not an error; it is reported as `Ok(None)`.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for document store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error occurred while connecting to the backing database
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A document could not be encoded or decoded
    #[error("Document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A write violated a uniqueness constraint
    #[error("Uniqueness constraint violated: {0}")]
    Conflict(String),

    /// Partial update targeted a document that does not exist
    #[error("Document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl StoreError {
    /// Classify a query failure, surfacing unique violations as conflicts
    pub(crate) fn from_query(error: SqlxError) -> Self {
        match &error {
            SqlxError::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            _ => StoreError::Query(error),
        }
    }
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
