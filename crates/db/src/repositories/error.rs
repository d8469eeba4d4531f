//! Error type shared by the repositories.

use roster_core::hydration::HydrationError;
use roster_shared::AppError;
use sea_orm::DbErr;
use uuid::Uuid;

/// Error types for repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity name, e.g. "employee".
        entity: &'static str,
        /// The missing id.
        id: Uuid,
    },

    /// The write would violate a uniqueness rule.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Association hydration failed.
    #[error(transparent)]
    Hydration(#[from] HydrationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    pub(crate) const fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => Self::NotFound(err.to_string()),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            RepositoryError::Validation(msg) => Self::Validation(msg),
            RepositoryError::Hydration(err) => err.into(),
            RepositoryError::Database(err) => Self::Database(err.to_string()),
        }
    }
}

/// Rejects blank required text fields.
pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<(), RepositoryError> {
    if value.trim().is_empty() {
        return Err(RepositoryError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_client_error() {
        let id = Uuid::nil();
        let app: AppError = RepositoryError::not_found("employee", id).into();

        assert_eq!(app.error_code(), "NOT_FOUND");
        assert!(app.to_string().contains("employee not found"));
    }

    #[test]
    fn test_hydration_failure_maps_to_database_error() {
        let err = RepositoryError::from(HydrationError::DataAccess {
            parent_type: "employee",
            association: "trainings",
            source: "connection reset".into(),
        });

        let app: AppError = err.into();
        assert_eq!(app.error_code(), "DATABASE_ERROR");
        assert!(app.to_string().contains("trainings"));
    }

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("name", "Ops").is_ok());
        assert!(matches!(
            require_non_blank("name", "  "),
            Err(RepositoryError::Validation(msg)) if msg == "name must not be empty"
        ));
    }
}
