//! Error types for rowdb
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using RowDbError
pub type Result<T> = std::result::Result<T, RowDbError>;

/// Unified error type for rowdb operations
#[derive(Debug, Error)]
pub enum RowDbError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    /// A value violates a field's constraint at pack time
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Stored bytes do not decode as the field claims
    #[error("Decoding error: {0}")]
    Decoding(String),

    // -------------------------------------------------------------------------
    // Record Store Errors
    // -------------------------------------------------------------------------
    #[error("Row not found: {0}")]
    RowNotFound(u64),

    #[error("Invalid row id: {0:?}")]
    InvalidId(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    // -------------------------------------------------------------------------
    // Schema / Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
