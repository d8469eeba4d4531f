//! Hydration error types.

use roster_shared::AppError;
use thiserror::Error;

/// Error returned by a batch fetcher's backing store.
pub type FetchError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while registering or hydrating associations.
#[derive(Debug, Error)]
pub enum HydrationError {
    /// The same association was registered twice for one parent type.
    #[error("Association '{association}' is already registered for {parent_type}")]
    DuplicateAssociation {
        /// The parent type.
        parent_type: &'static str,
        /// The association name.
        association: &'static str,
    },

    /// The backing store failed while fetching an association.
    #[error("Failed to fetch '{association}' for {parent_type}: {source}")]
    DataAccess {
        /// The parent type.
        parent_type: &'static str,
        /// The association whose fetch failed.
        association: &'static str,
        /// The underlying store error.
        source: FetchError,
    },
}

impl HydrationError {
    /// Returns the association the error is tagged with.
    #[must_use]
    pub const fn association(&self) -> &'static str {
        match self {
            Self::DuplicateAssociation { association, .. } | Self::DataAccess { association, .. } => {
                *association
            }
        }
    }

    /// Returns the error code for logs and responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateAssociation { .. } => "DUPLICATE_ASSOCIATION",
            Self::DataAccess { .. } => "DATA_ACCESS_ERROR",
        }
    }
}

impl From<HydrationError> for AppError {
    fn from(err: HydrationError) -> Self {
        match err {
            HydrationError::DuplicateAssociation { .. } => Self::Configuration(err.to_string()),
            HydrationError::DataAccess { .. } => Self::Database(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_duplicate_association_error() {
        let err = HydrationError::DuplicateAssociation {
            parent_type: "employee",
            association: "trainings",
        };
        assert_eq!(err.error_code(), "DUPLICATE_ASSOCIATION");
        assert_eq!(err.association(), "trainings");
        assert_eq!(
            err.to_string(),
            "Association 'trainings' is already registered for employee"
        );
        assert!(matches!(AppError::from(err), AppError::Configuration(_)));
    }

    #[test]
    fn test_data_access_error_keeps_source() {
        let err = HydrationError::DataAccess {
            parent_type: "team",
            association: "members",
            source: "connection reset".into(),
        };
        assert_eq!(err.error_code(), "DATA_ACCESS_ERROR");
        assert_eq!(err.association(), "members");
        assert_eq!(err.source().unwrap().to_string(), "connection reset");
        assert!(err.to_string().contains("members"));

        let app: AppError = err.into();
        assert!(matches!(app, AppError::Database(msg) if msg.contains("connection reset")));
    }
}
