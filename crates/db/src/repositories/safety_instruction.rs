//! Safety instruction repository.
//!
//! Instructions are versioned: changing the content bumps the version, so
//! acknowledgements of an older version can be told apart.

use std::sync::Arc;

use roster_core::audit::AuditorProvider;
use roster_shared::types::{PageRequest, PageResponse, SafetyInstructionId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use super::error::{RepositoryError, require_non_blank};
use crate::entities::{employee_safety_instructions, safety_instructions};
use crate::storage;

/// Input for creating a safety instruction.
#[derive(Debug, Clone)]
pub struct CreateSafetyInstructionInput {
    /// Instruction title.
    pub title: String,
    /// Instruction body.
    pub content: String,
}

/// Input for updating a safety instruction.
#[derive(Debug, Clone, Default)]
pub struct UpdateSafetyInstructionInput {
    /// Instruction title.
    pub title: Option<String>,
    /// Instruction body. A changed body bumps the version.
    pub content: Option<String>,
}

/// Safety instruction repository for CRUD operations.
#[derive(Clone)]
pub struct SafetyInstructionRepository {
    db: DatabaseConnection,
    auditor: Arc<dyn AuditorProvider>,
}

impl SafetyInstructionRepository {
    /// Creates a new safety instruction repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, auditor: Arc<dyn AuditorProvider>) -> Self {
        Self { db, auditor }
    }

    /// Creates a safety instruction at version 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the title or content is blank, or the insert fails.
    pub async fn create(
        &self,
        input: CreateSafetyInstructionInput,
    ) -> Result<safety_instructions::Model, RepositoryError> {
        require_non_blank("title", &input.title)?;
        require_non_blank("content", &input.content)?;

        let principal = self.auditor.current_auditor();
        let now = chrono::Utc::now().into();
        let instruction = safety_instructions::ActiveModel {
            id: Set(SafetyInstructionId::new().into_inner()),
            title: Set(input.title),
            content: Set(input.content),
            version: Set(1),
            created_by: Set(principal.clone()),
            modified_by: Set(principal),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(
            instruction_id = %instruction.id,
            created_by = %instruction.created_by,
            "Created safety instruction"
        );
        Ok(instruction)
    }

    /// Updates a safety instruction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the instruction does not exist, or a validation
    /// error for blank fields.
    pub async fn update(
        &self,
        id: SafetyInstructionId,
        input: UpdateSafetyInstructionInput,
    ) -> Result<safety_instructions::Model, RepositoryError> {
        if let Some(title) = &input.title {
            require_non_blank("title", title)?;
        }
        if let Some(content) = &input.content {
            require_non_blank("content", content)?;
        }

        let instruction =
            storage::get_by_id::<safety_instructions::Entity, _>(&self.db, id.into_inner())
                .await?
                .ok_or_else(|| RepositoryError::not_found("safety instruction", id.into_inner()))?;

        let next_version = match &input.content {
            Some(content) if *content != instruction.content => instruction.version + 1,
            _ => instruction.version,
        };

        let mut active: safety_instructions::ActiveModel = instruction.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        active.version = Set(next_version);
        active.modified_by = Set(self.auditor.current_auditor());
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        info!(
            instruction_id = %updated.id,
            version = updated.version,
            modified_by = %updated.modified_by,
            "Updated safety instruction"
        );
        Ok(updated)
    }

    /// Deletes a safety instruction and its acknowledgements.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the instruction does not exist.
    pub async fn delete(&self, id: SafetyInstructionId) -> Result<(), RepositoryError> {
        let id: Uuid = id.into_inner();
        let txn = self.db.begin().await?;

        employee_safety_instructions::Entity::delete_many()
            .filter(employee_safety_instructions::Column::SafetyInstructionId.eq(id))
            .exec(&txn)
            .await?;
        let result = safety_instructions::Entity::delete_by_id(id)
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("safety instruction", id));
        }
        txn.commit().await?;

        info!(
            instruction_id = %id,
            deleted_by = %self.auditor.current_auditor(),
            "Deleted safety instruction"
        );
        Ok(())
    }

    /// Finds a safety instruction by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: SafetyInstructionId,
    ) -> Result<Option<safety_instructions::Model>, RepositoryError> {
        Ok(storage::get_by_id::<safety_instructions::Entity, _>(&self.db, id.into_inner()).await?)
    }

    /// Lists safety instructions ordered by title.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        request: PageRequest,
    ) -> Result<PageResponse<safety_instructions::Model>, RepositoryError> {
        let (rows, total) = storage::get_page::<safety_instructions::Entity, _>(
            &self.db,
            safety_instructions::Column::Title,
            request,
        )
        .await?;
        Ok(PageResponse::for_request(rows, request, total))
    }
}

impl std::fmt::Debug for SafetyInstructionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafetyInstructionRepository")
            .finish_non_exhaustive()
    }
}
