//! Repository Error Types
//!
//! Errors raised by the generic repository layer. Data-access failures are
//! carried unchanged in [`RepositoryError::Database`]; translating them into
//! a domain error kind is the caller's job.

/// Error returned by repository, query and unit-of-work operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Zero rows where exactly one was expected.
    #[error("record not found")]
    NotFound,

    /// Caller input rejected before reaching the database.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An UPDATE or DELETE was requested without any predicate.
    #[error("refusing to {0} without a WHERE clause")]
    MissingWhereClause(&'static str),

    /// A preload or association call named a relation the entity does not declare.
    #[error("unknown association `{association}` on `{table}`")]
    UnknownAssociation {
        table: &'static str,
        association: String,
    },

    /// A write was attempted through a read-only unit of work.
    #[error("unit of work is read-only")]
    ReadOnly,

    /// The unit of work has already been committed or rolled back.
    #[error("unit of work is already finished")]
    Finished,

    /// A bind value could not be encoded.
    #[error("could not bind argument: {0}")]
    Bind(String),

    /// Underlying data-access error, propagated unmodified.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl RepositoryError {
    /// Build a validation error from any displayable message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the error was caused by caller input rather than the data store.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::MissingWhereClause(_)
                | Self::UnknownAssociation { .. }
                | Self::ReadOnly
        )
    }

    /// Whether the error is a unique-constraint violation reported by Postgres.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}
