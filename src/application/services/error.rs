//! Service errors and the unit-of-work scoping helper.

use validator::ValidationErrors;

use crate::infrastructure::database::UnitOfWork;
use crate::infrastructure::events::EventError;
use crate::infrastructure::repositories::RepositoryError;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;

/// Errors raised by the application services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid input: {0}")]
    Invalid(ValidationErrors),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Event(#[from] EventError),
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Invalid(errors)
    }
}

impl ServiceError {
    /// Turn a repository `NotFound` into one naming the missing resource.
    pub fn not_found(resource: &'static str) -> impl FnOnce(RepositoryError) -> ServiceError {
        move |err| match err {
            RepositoryError::NotFound => ServiceError::NotFound(resource),
            other => ServiceError::Repository(other),
        }
    }

    /// Turn a unique-constraint violation into a `Conflict` carrying `message`.
    ///
    /// Concurrent writers can both pass an existence check; the index decides.
    pub fn conflict_on_unique(message: impl Into<String>) -> impl FnOnce(RepositoryError) -> ServiceError {
        let message = message.into();
        move |err| {
            if err.is_unique_violation() {
                ServiceError::Conflict(message)
            } else {
                ServiceError::Repository(err)
            }
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(resource) => AppError::NotFound(format!("{} not found", resource)),
            ServiceError::Invalid(errors) => validation_error(errors),
            ServiceError::Validation(message) => AppError::validation(message),
            ServiceError::Conflict(message) => AppError::Conflict(message),
            ServiceError::Repository(e) => e.into(),
            ServiceError::Event(e) => e.into(),
        }
    }
}

/// Commit on success, roll back on failure.
///
/// A rollback failure is logged; the original error is returned.
pub async fn finish<T>(uow: UnitOfWork, result: Result<T, ServiceError>) -> Result<T, ServiceError> {
    match result {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = uow.rollback().await {
                tracing::warn!(error = %rollback, "Rollback failed");
            }
            Err(err)
        }
    }
}

/// Ids in `wanted` that are not in `found`.
pub(crate) fn missing_ids(wanted: &[uuid::Uuid], found: &[uuid::Uuid]) -> Vec<uuid::Uuid> {
    wanted.iter().filter(|id| !found.contains(id)).copied().collect()
}

/// Deduplicate while keeping first-seen order.
pub(crate) fn dedup_ids(ids: &[uuid::Uuid]) -> Vec<uuid::Uuid> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    unique
}
