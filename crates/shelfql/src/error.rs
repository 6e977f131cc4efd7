//! Error types for shelfql

use thiserror::Error;

/// Result type alias for shelfql operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Error types for query building and execution
#[derive(Debug, Error)]
pub enum QueryError {
    /// Identifier failed the syntactic check
    #[error("Invalid identifier: {0}")]
    Identifier(String),

    /// Free-text clause failed the sanitizer
    #[error("Unsafe clause: {0}")]
    UnsafeClause(String),

    /// A required builder field is missing
    #[error("Incomplete specification: {0}")]
    Incomplete(String),

    /// Table is not present in the registry
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Column is not present in its table's schema
    #[error("Unknown column '{column}' in table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// Query execution error
    #[cfg(feature = "exec")]
    #[error("Query error: {0}")]
    Execute(#[from] tokio_postgres::Error),

    /// Row decode error
    #[cfg(feature = "exec")]
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl QueryError {
    /// Create an identifier error
    pub fn identifier(message: impl Into<String>) -> Self {
        Self::Identifier(message.into())
    }

    /// Create an unsafe-clause error
    pub fn unsafe_clause(message: impl Into<String>) -> Self {
        Self::UnsafeClause(message.into())
    }

    /// Create an incomplete-specification error
    pub fn incomplete(message: impl Into<String>) -> Self {
        Self::Incomplete(message.into())
    }

    /// Create a decode error for a specific column
    #[cfg(feature = "exec")]
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this error comes from user input (as opposed to execution)
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            Self::Identifier(_)
                | Self::UnsafeClause(_)
                | Self::Incomplete(_)
                | Self::UnknownTable(_)
                | Self::UnknownColumn { .. }
        )
    }

    /// Check if this is an incomplete-specification error
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Incomplete(_))
    }
}
