//! Training catalog repository.

use std::sync::Arc;

use roster_core::audit::AuditorProvider;
use roster_shared::types::{PageRequest, PageResponse, TrainingId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use super::error::{RepositoryError, require_non_blank};
use crate::entities::{employee_trainings, trainings};
use crate::storage;

/// Input for creating a training.
#[derive(Debug, Clone)]
pub struct CreateTrainingInput {
    /// Course title.
    pub title: String,
    /// Course description.
    pub description: Option<String>,
    /// Months a completion stays valid. `None` never expires.
    pub validity_months: Option<i32>,
}

/// Input for updating a training.
#[derive(Debug, Clone, Default)]
pub struct UpdateTrainingInput {
    /// Course title.
    pub title: Option<String>,
    /// Course description.
    pub description: Option<Option<String>>,
    /// Validity in months.
    pub validity_months: Option<Option<i32>>,
}

fn validate_validity(validity_months: Option<i32>) -> Result<(), RepositoryError> {
    match validity_months {
        Some(months) if months <= 0 => Err(RepositoryError::Validation(format!(
            "validity_months must be positive, got {months}"
        ))),
        _ => Ok(()),
    }
}

/// Training repository for CRUD operations.
#[derive(Clone)]
pub struct TrainingRepository {
    db: DatabaseConnection,
    auditor: Arc<dyn AuditorProvider>,
}

impl TrainingRepository {
    /// Creates a new training repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, auditor: Arc<dyn AuditorProvider>) -> Self {
        Self { db, auditor }
    }

    /// Creates a training.
    ///
    /// # Errors
    ///
    /// Returns an error if the title is blank, the validity is not positive,
    /// or the insert fails.
    pub async fn create(
        &self,
        input: CreateTrainingInput,
    ) -> Result<trainings::Model, RepositoryError> {
        require_non_blank("title", &input.title)?;
        validate_validity(input.validity_months)?;

        let principal = self.auditor.current_auditor();
        let now = chrono::Utc::now().into();
        let training = trainings::ActiveModel {
            id: Set(TrainingId::new().into_inner()),
            title: Set(input.title),
            description: Set(input.description),
            validity_months: Set(input.validity_months),
            created_by: Set(principal.clone()),
            modified_by: Set(principal),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(training_id = %training.id, created_by = %training.created_by, "Created training");
        Ok(training)
    }

    /// Updates a training.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the training does not exist, or a validation
    /// error for a blank title or non-positive validity.
    pub async fn update(
        &self,
        id: TrainingId,
        input: UpdateTrainingInput,
    ) -> Result<trainings::Model, RepositoryError> {
        if let Some(title) = &input.title {
            require_non_blank("title", title)?;
        }
        if let Some(validity_months) = input.validity_months {
            validate_validity(validity_months)?;
        }

        let training = storage::get_by_id::<trainings::Entity, _>(&self.db, id.into_inner())
            .await?
            .ok_or_else(|| RepositoryError::not_found("training", id.into_inner()))?;

        let mut active: trainings::ActiveModel = training.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(validity_months) = input.validity_months {
            active.validity_months = Set(validity_months);
        }
        active.modified_by = Set(self.auditor.current_auditor());
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        info!(training_id = %updated.id, modified_by = %updated.modified_by, "Updated training");
        Ok(updated)
    }

    /// Deletes a training and every completion record that references it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the training does not exist.
    pub async fn delete(&self, id: TrainingId) -> Result<(), RepositoryError> {
        let id: Uuid = id.into_inner();
        let txn = self.db.begin().await?;

        employee_trainings::Entity::delete_many()
            .filter(employee_trainings::Column::TrainingId.eq(id))
            .exec(&txn)
            .await?;
        let result = trainings::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("training", id));
        }
        txn.commit().await?;

        info!(training_id = %id, deleted_by = %self.auditor.current_auditor(), "Deleted training");
        Ok(())
    }

    /// Finds a training by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: TrainingId,
    ) -> Result<Option<trainings::Model>, RepositoryError> {
        Ok(storage::get_by_id::<trainings::Entity, _>(&self.db, id.into_inner()).await?)
    }

    /// Lists trainings ordered by title.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        request: PageRequest,
    ) -> Result<PageResponse<trainings::Model>, RepositoryError> {
        let (rows, total) =
            storage::get_page::<trainings::Entity, _>(&self.db, trainings::Column::Title, request)
                .await?;
        Ok(PageResponse::for_request(rows, request, total))
    }
}

impl std::fmt::Debug for TrainingRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainingRepository").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, true)]
    #[case(Some(12), true)]
    #[case(Some(0), false)]
    #[case(Some(-6), false)]
    fn test_validate_validity(#[case] months: Option<i32>, #[case] ok: bool) {
        assert_eq!(validate_validity(months).is_ok(), ok);
    }
}
