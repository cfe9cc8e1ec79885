//! Error types for bazaar-store
//!
//! Every failure belongs to exactly one [`Operation`] kind. Driver errors
//! are wrapped as-is; callers cannot tell a constraint violation from a
//! dropped connection, only which operation failed.

use std::fmt;

use bazaar_core::ValidationError;
use thiserror::Error;

pub type DaoResult<T> = Result<T, DaoError>;

/// The four failure kinds a DAO call can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fetch,
    Store,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Store => "store",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("{op} failed: {source}")]
    Database {
        op: Operation,
        #[source]
        source: sqlx::Error,
    },

    /// A single-entity fetch matched no row
    #[error("no such {resource} with {key} = {value}")]
    NotFound {
        resource: &'static str,
        key: &'static str,
        value: String,
    },

    #[error("{op} rejected: {source}")]
    Invalid {
        op: Operation,
        #[source]
        source: ValidationError,
    },
}

impl DaoError {
    pub fn fetch(source: sqlx::Error) -> Self {
        Self::Database {
            op: Operation::Fetch,
            source,
        }
    }

    pub fn store(source: sqlx::Error) -> Self {
        Self::Database {
            op: Operation::Store,
            source,
        }
    }

    pub fn update(source: sqlx::Error) -> Self {
        Self::Database {
            op: Operation::Update,
            source,
        }
    }

    pub fn delete(source: sqlx::Error) -> Self {
        Self::Database {
            op: Operation::Delete,
            source,
        }
    }

    pub fn invalid(op: Operation, source: ValidationError) -> Self {
        Self::Invalid { op, source }
    }

    pub fn not_found(resource: &'static str, key: &'static str, value: impl ToString) -> Self {
        Self::NotFound {
            resource,
            key,
            value: value.to_string(),
        }
    }

    /// Which operation kind this failure belongs to.
    pub fn kind(&self) -> Operation {
        match self {
            Self::Database { op, .. } | Self::Invalid { op, .. } => *op,
            Self::NotFound { .. } => Operation::Fetch,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_a_fetch_failure() {
        let err = DaoError::not_found("country", "id", 42);
        assert_eq!(err.kind(), Operation::Fetch);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "no such country with id = 42");
    }

    #[test]
    fn driver_errors_keep_their_operation() {
        assert_eq!(DaoError::store(sqlx::Error::PoolTimedOut).kind(), Operation::Store);
        assert_eq!(DaoError::update(sqlx::Error::RowNotFound).kind(), Operation::Update);
        assert_eq!(DaoError::delete(sqlx::Error::PoolClosed).kind(), Operation::Delete);
        assert_eq!(DaoError::fetch(sqlx::Error::PoolClosed).kind(), Operation::Fetch);
    }

    #[test]
    fn validation_errors_report_operation() {
        let err = DaoError::invalid(
            Operation::Update,
            ValidationError::Empty {
                field: "country name",
            },
        );
        assert_eq!(err.kind(), Operation::Update);
        assert_eq!(err.to_string(), "update rejected: country name cannot be empty");
    }

    #[test]
    fn source_is_preserved() {
        use std::error::Error as _;

        let err = DaoError::fetch(sqlx::Error::PoolTimedOut);
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("fetch failed: "));
    }
}
