use thiserror::Error;

/// Unified error type for user store operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// Entity not found by the given identifier
    #[error("Entity not found")]
    NotFound,

    /// Unique constraint violation
    #[error("Unique constraint violation")]
    UniqueViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convert from sqlx::Error using proper sqlx error categorization
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DbError::UniqueViolation {
                constraint: db_err.constraint().map(|s| s.to_string()),
                table: db_err.table().map(|s| s.to_string()),
                message: db_err.message().to_string(),
            },
            // All other sqlx errors are non-recoverable - convert to anyhow with context
            _ => DbError::Other(anyhow::Error::from(err)),
        }
    }
}

/// Failed or out-of-order migrations are fatal at startup
impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Other(anyhow::Error::from(err))
    }
}

impl DbError {
    /// True when the error is a unique violation on the username column
    pub fn is_duplicate_username(&self) -> bool {
        match self {
            DbError::UniqueViolation { constraint, .. } => constraint.as_deref().is_none_or(|c| c.contains("username")),
            _ => false,
        }
    }
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(DbError::from(sqlx::Error::RowNotFound), DbError::NotFound));
    }

    #[test]
    fn test_pool_errors_are_other() {
        assert!(matches!(DbError::from(sqlx::Error::PoolTimedOut), DbError::Other(_)));
    }

    #[test]
    fn test_migration_errors_are_other() {
        let err = DbError::from(sqlx::migrate::MigrateError::VersionMissing(20250101000000));
        assert!(matches!(err, DbError::Other(_)));
        assert!(err.to_string().contains("20250101000000"));
    }

    #[test]
    fn test_duplicate_username_detection() {
        let on_username = DbError::UniqueViolation {
            constraint: Some("users_username_key".to_string()),
            table: Some("users".to_string()),
            message: "duplicate key value".to_string(),
        };
        assert!(on_username.is_duplicate_username());

        let elsewhere = DbError::UniqueViolation {
            constraint: Some("users_pkey".to_string()),
            table: Some("users".to_string()),
            message: "duplicate key value".to_string(),
        };
        assert!(!elsewhere.is_duplicate_username());
        assert!(!DbError::NotFound.is_duplicate_username());
    }
}
