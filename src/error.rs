//! Error types for the LocalLibrary catalog data layer
//!
//! This module defines error types using thiserror for ergonomic error handling.
//! Errors are categorized by domain (validation, database, file) so callers in
//! the web layer can decide between a 400-style response (bad input), a
//! 404-style response (missing record), and a 500-style response (everything
//! else) without string matching.

use thiserror::Error;

/// Result type alias using our CatalogError type
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Main error type for the catalog data layer
///
/// Each variant includes a descriptive message and relevant context.
/// Constraint violations raised by SQLite (foreign keys, CHECK on loan
/// status, unique genre names) surface as `SqlxError`.
#[derive(Error, Debug)]
pub enum CatalogError {
    // ===== Validation Errors =====

    /// Generic input validation error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Required field is missing or empty
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// Loan status code is not one of 'm', 'o', 'a', 'r'
    #[error("Invalid loan status code: {0:?}")]
    InvalidStatusCode(String),

    /// ISBN is not the fixed 13-character form
    #[error("Invalid ISBN {value:?}: expected 13 characters, got {length}")]
    InvalidIsbn { value: String, length: usize },

    /// Field exceeds its declared maximum length
    #[error("Field '{field}' exceeds maximum length {max} (got {actual})")]
    FieldTooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    // ===== Database Errors =====

    /// Database record not found
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// Database schema migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database query execution failed
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    // ===== File/State Errors =====

    /// Generic file I/O error (database directory creation)
    #[error("File I/O error: {0}")]
    FileIoError(String),

    /// Internal error that should not normally occur
    #[error("Internal error: {0}")]
    InternalError(String),

    // ===== External Library Errors =====

    /// Database driver error from sqlx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// Helper methods for creating common errors
impl CatalogError {
    /// Create a RecordNotFound error with a resource name
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        CatalogError::RecordNotFound(resource.into())
    }

    /// Create an InvalidInput error with a message
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        CatalogError::InvalidInput(message.into())
    }

    /// Create an InternalError with a message
    pub fn internal<S: Into<String>>(message: S) -> Self {
        CatalogError::InternalError(message.into())
    }

    /// Check if error came from caller-supplied data
    ///
    /// Returns `true` for errors the web layer should report as bad input
    /// rather than as a server fault.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            CatalogError::InvalidInput(_)
                | CatalogError::MissingRequiredField(_)
                | CatalogError::InvalidStatusCode(_)
                | CatalogError::InvalidIsbn { .. }
                | CatalogError::FieldTooLong { .. }
        )
    }

    /// Check if error means the requested record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::RecordNotFound(_) | CatalogError::SqlxError(sqlx::Error::RowNotFound)
        )
    }

    /// Check if error is a constraint violation from the datastore
    /// (unique name, foreign key, loan status CHECK)
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            CatalogError::SqlxError(sqlx::Error::Database(db_err)) => {
                db_err.is_unique_violation()
                    || db_err.is_foreign_key_violation()
                    || db_err.is_check_violation()
            }
            _ => false,
        }
    }

    /// Get user-friendly error message suitable for display
    ///
    /// Technical detail is kept for logs; this is what a template may show.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::RecordNotFound(resource) => {
                format!("{} was not found in the catalog.", resource)
            }
            CatalogError::InvalidIsbn { value, .. } => {
                format!("'{}' is not a valid 13-character ISBN.", value)
            }
            CatalogError::InvalidStatusCode(code) => {
                format!(
                    "'{}' is not a loan status. Valid codes: m (maintenance), o (on loan), a (available), r (reserved).",
                    code
                )
            }
            CatalogError::FieldTooLong { field, max, .. } => {
                format!("The {} field is limited to {} characters.", field, max)
            }
            CatalogError::SqlxError(sqlx::Error::Database(db_err))
                if db_err.is_unique_violation() =>
            {
                "A record with that name already exists.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_categorization() {
        let err = CatalogError::InvalidIsbn {
            value: "123".to_string(),
            length: 3,
        };
        assert!(err.is_validation_error());
        assert!(!err.is_not_found());

        let err = CatalogError::not_found("Book 42");
        assert!(err.is_not_found());
        assert!(!err.is_validation_error());
    }

    #[test]
    fn test_user_message_for_status_code() {
        let err = CatalogError::InvalidStatusCode("x".to_string());
        let message = err.user_message();
        assert!(message.contains("not a loan status"));
        assert!(message.contains("m (maintenance)"));
    }
}
