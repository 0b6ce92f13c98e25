use sqlx::Error as SqlxError;
use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed input: blank remark on rejection, non-positive budget
    /// amount, sub-event count out of range, and the like
    #[error("Validation error: {0}")]
    Validation(String),

    /// Actor lacks standing for the requested action: wrong POC, wrong
    /// reviewer role for the stage, viewer not entitled
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Action attempted out of sequence, e.g. a role decision while the
    /// event is still in POC review
    #[error("Workflow error: {0}")]
    Workflow(String),

    /// Referenced event/sub-event/club/user does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Aggregate was modified concurrently; the write was not applied
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] crate::database::DatabaseError),

    /// SQLx database errors
    #[error("SQL error: {0}")]
    Sqlx(#[from] SqlxError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// UUID parsing errors
    #[error("Invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Get HTTP status code for the error, for whatever transport wraps
    /// the services layer
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::Unauthorized(_) => 403,
            AppError::NotFound(_) => 404,
            AppError::Conflict(_) => 409,
            AppError::Workflow(_) => 422,
            AppError::Config(_) => 500,
            AppError::Database(_) | AppError::Sqlx(_) => 500,
            _ => 500,
        }
    }
}

/// Repository-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database query error
    #[error("Query error: {0}")]
    Query(SqlxError),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Duplicate record
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Version check failed on aggregate save
    #[error("Stale aggregate: {0}")]
    StaleAggregate(String),

    /// Invalid stored data (e.g. unknown enum label, bad breakdown JSON)
    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            RepositoryError::Query(e) => AppError::Sqlx(e),
            RepositoryError::Duplicate(msg) => AppError::Conflict(format!("Duplicate: {}", msg)),
            RepositoryError::ConstraintViolation(msg) => AppError::Validation(msg),
            RepositoryError::StaleAggregate(msg) => AppError::Conflict(msg),
            RepositoryError::InvalidData(msg) => AppError::Message(msg),
        }
    }
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => RepositoryError::NotFound("Record not found".to_string()),
            SqlxError::Database(db_err) => {
                // Check for common PostgreSQL error codes
                let code = db_err.code().map(|c| c.to_string());
                if code.as_deref() == Some("23505") {
                    // Unique violation
                    RepositoryError::Duplicate(db_err.message().to_string())
                } else if code.as_deref() == Some("23503") || code.as_deref() == Some("23514") {
                    // Foreign key / check constraint violation
                    RepositoryError::ConstraintViolation(db_err.message().to_string())
                } else {
                    RepositoryError::Query(err)
                }
            }
            _ => RepositoryError::Query(err),
        }
    }
}
