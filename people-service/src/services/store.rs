//! The persistence seam between the HTTP handlers and the backing database.

use async_trait::async_trait;
use mongodb::error::ErrorKind;
use service_core::error::AppError;
use thiserror::Error;

use crate::dtos::PersonPayload;
use crate::models::{Person, PersonId};

/// Failure kinds a store operation can report.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("person not found")]
    NotFound,

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(anyhow::Error),
}

impl StoreError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::NotFound => "not_found",
            StoreError::ValidationFailed(_) => "validation_failed",
            StoreError::StoreUnavailable(_) => "unavailable",
        }
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::Write(_)
            | ErrorKind::BsonSerialization(_)
            | ErrorKind::BsonDeserialization(_)
            | ErrorKind::InvalidArgument { .. } => StoreError::ValidationFailed(err.to_string()),
            _ => StoreError::StoreUnavailable(anyhow::Error::new(err)),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound(anyhow::anyhow!("person not found")),
            StoreError::ValidationFailed(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            StoreError::StoreUnavailable(e) => AppError::ServiceUnavailable(e),
        }
    }
}

/// CRUD over person records.
///
/// `update_by_id` and `delete_by_id` return `Ok(None)` when no record matches;
/// only `find_by_id` callers decide whether a miss is an error.
#[async_trait]
pub trait PersonStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Person>, StoreError>;

    async fn create(&self, payload: PersonPayload) -> Result<Person, StoreError>;

    async fn find_by_id(&self, id: PersonId) -> Result<Option<Person>, StoreError>;

    /// Returns the record as it is after the update.
    async fn update_by_id(
        &self,
        id: PersonId,
        payload: PersonPayload,
    ) -> Result<Option<Person>, StoreError>;

    /// Returns the record as it was before deletion.
    async fn delete_by_id(&self, id: PersonId) -> Result<Option<Person>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn error_kinds_map_to_distinct_statuses() {
        let not_found: AppError = StoreError::NotFound.into();
        let invalid: AppError = StoreError::ValidationFailed("bad id".into()).into();
        let down: AppError = StoreError::StoreUnavailable(anyhow::anyhow!("timeout")).into();

        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn driver_argument_errors_are_validation_failures() {
        let err = mongodb::error::Error::from(ErrorKind::InvalidArgument {
            message: "document too large".to_string(),
        });
        assert!(matches!(StoreError::from(err), StoreError::ValidationFailed(_)));
    }

    #[test]
    fn driver_io_errors_mean_the_store_is_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = mongodb::error::Error::from(ErrorKind::Io(std::sync::Arc::new(io)));
        assert!(matches!(StoreError::from(err), StoreError::StoreUnavailable(_)));
    }
}
