//! Error types for the database MCP server.
//!
//! All failures surface as one of six `DbError` categories. Driver errors are
//! classified by SQLSTATE where the backend reports one, so a missing table
//! becomes `NotFound` and a malformed statement becomes `Syntax` regardless of
//! which backend produced it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// Invalid or missing configuration, including unknown database names.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A referenced object (table, database entry) does not exist.
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The backend rejected the statement as malformed.
    #[error("SQL syntax error: {message}")]
    Syntax { message: String },

    /// The backend is unreachable, refused the connection, or dropped it.
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// Any other error reported by the database backend.
    #[error("Database error: {message}")]
    Driver {
        message: String,
        /// e.g., "23505" for a unique violation
        sql_state: Option<String>,
    },

    /// Anything that escaped the categories above.
    #[error("Unexpected error: {message}")]
    Unexpected { message: String },
}

impl DbError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a syntax error.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a driver error with optional SQL state.
    pub fn driver(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Driver {
            message: message.into(),
            sql_state,
        }
    }

    /// Create an unexpected error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Stable category name, used in logs.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::NotFound { .. } => "not_found",
            Self::Syntax { .. } => "syntax",
            Self::Connection { .. } => "connection",
            Self::Driver { .. } => "driver",
            Self::Unexpected { .. } => "unexpected",
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Classify a backend-reported error by its SQLSTATE.
///
/// Class 42 is the ISO syntax-or-access-rule class; MySQL additionally uses
/// the ODBC-style states 42S01/42S02 for existing/missing tables, and
/// PostgreSQL uses 42P01 for an undefined table. Classes 08 and 28 cover
/// connectivity and authentication.
fn classify_database_error(err: &dyn sqlx::error::DatabaseError) -> DbError {
    let message = err.message().to_string();
    let state = err.code().map(|c| c.to_string());
    match state.as_deref() {
        Some("42S02") | Some("42P01") => DbError::not_found(message),
        Some(code) if code.starts_with("42") => DbError::syntax(message),
        Some(code) if code.starts_with("08") || code.starts_with("28") => {
            DbError::connection(message)
        }
        _ => DbError::Driver {
            message,
            sql_state: state,
        },
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => classify_database_error(db_err.as_ref()),
            sqlx::Error::Configuration(msg) => {
                DbError::connection(format!("Invalid connection configuration: {}", msg))
            }
            sqlx::Error::PoolTimedOut => {
                DbError::connection("Timed out acquiring a connection from the pool")
            }
            sqlx::Error::PoolClosed => DbError::connection("Connection pool is closed"),
            sqlx::Error::Io(io_err) => DbError::connection(format!("I/O error: {}", io_err)),
            sqlx::Error::Tls(tls_err) => DbError::connection(format!("TLS error: {}", tls_err)),
            sqlx::Error::Protocol(msg) => DbError::connection(format!("Protocol error: {}", msg)),
            sqlx::Error::ColumnNotFound(col) => {
                DbError::not_found(format!("Column not found: {}", col))
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => DbError::unexpected(format!(
                "Column index {} out of bounds (len: {})",
                index, len
            )),
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::unexpected(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DbError::unexpected(format!("Decode error: {}", source)),
            sqlx::Error::WorkerCrashed => DbError::unexpected("Database worker crashed"),
            other => DbError::unexpected(format!("Unknown database error: {}", other)),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;
