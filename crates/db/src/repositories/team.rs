//! Team repository. Reads return teams hydrated with their members.

use std::sync::Arc;

use roster_core::audit::AuditorProvider;
use roster_core::hydration::Hydrator;
use roster_shared::types::{PageRequest, PageResponse, TeamId};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use super::error::{RepositoryError, require_non_blank};
use crate::entities::{employees, teams};
use crate::hydration::TeamRecord;
use crate::storage;

/// Input for creating a team.
#[derive(Debug, Clone)]
pub struct CreateTeamInput {
    /// Team name, unique.
    pub name: String,
    /// Team description.
    pub description: Option<String>,
}

/// Input for updating a team.
#[derive(Debug, Clone, Default)]
pub struct UpdateTeamInput {
    /// Team name.
    pub name: Option<String>,
    /// Team description.
    pub description: Option<Option<String>>,
}

/// Team repository for CRUD operations.
#[derive(Clone)]
pub struct TeamRepository {
    db: DatabaseConnection,
    auditor: Arc<dyn AuditorProvider>,
    hydrator: Hydrator<TeamRecord, DatabaseTransaction>,
}

impl TeamRepository {
    /// Creates a new team repository.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        auditor: Arc<dyn AuditorProvider>,
        hydrator: Hydrator<TeamRecord, DatabaseTransaction>,
    ) -> Self {
        Self {
            db,
            auditor,
            hydrator,
        }
    }

    async fn ensure_name_available(
        &self,
        name: &str,
        except: Option<Uuid>,
    ) -> Result<(), RepositoryError> {
        let mut query = teams::Entity::find().filter(teams::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(teams::Column::Id.ne(id));
        }

        if query.one(&self.db).await?.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "Team name '{name}' already exists"
            )));
        }
        Ok(())
    }

    /// Creates a team.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or already taken.
    pub async fn create(&self, input: CreateTeamInput) -> Result<teams::Model, RepositoryError> {
        require_non_blank("name", &input.name)?;
        self.ensure_name_available(&input.name, None).await?;

        let principal = self.auditor.current_auditor();
        let now = chrono::Utc::now().into();
        let team = teams::ActiveModel {
            id: Set(TeamId::new().into_inner()),
            name: Set(input.name),
            description: Set(input.description),
            created_by: Set(principal.clone()),
            modified_by: Set(principal),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(team_id = %team.id, name = %team.name, created_by = %team.created_by, "Created team");
        Ok(team)
    }

    /// Updates a team.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the team does not exist, or `Conflict` if the new
    /// name is taken.
    pub async fn update(
        &self,
        id: TeamId,
        input: UpdateTeamInput,
    ) -> Result<teams::Model, RepositoryError> {
        let id = id.into_inner();
        let team = storage::get_by_id::<teams::Entity, _>(&self.db, id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("team", id))?;

        if let Some(name) = &input.name
            && *name != team.name
        {
            require_non_blank("name", name)?;
            self.ensure_name_available(name, Some(id)).await?;
        }

        let mut active: teams::ActiveModel = team.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        active.modified_by = Set(self.auditor.current_auditor());
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        info!(team_id = %updated.id, modified_by = %updated.modified_by, "Updated team");
        Ok(updated)
    }

    /// Deletes a team. Its members stay, without a team.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the team does not exist.
    pub async fn delete(&self, id: TeamId) -> Result<(), RepositoryError> {
        let id = id.into_inner();
        let principal = self.auditor.current_auditor();
        let txn = self.db.begin().await?;

        let released = employees::Entity::update_many()
            .col_expr(employees::Column::TeamId, Expr::value(Option::<Uuid>::None))
            .col_expr(employees::Column::ModifiedBy, Expr::value(principal.clone()))
            .col_expr(
                employees::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().fixed_offset()),
            )
            .filter(employees::Column::TeamId.eq(id))
            .exec(&txn)
            .await?;
        let result = teams::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("team", id));
        }
        txn.commit().await?;

        info!(
            team_id = %id,
            released_members = released.rows_affected,
            deleted_by = %principal,
            "Deleted team"
        );
        Ok(())
    }

    /// Finds a team by ID, with its members.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn find_by_id(&self, id: TeamId) -> Result<Option<TeamRecord>, RepositoryError> {
        let txn = storage::begin_snapshot(&self.db).await?;

        let team = storage::get_by_id::<teams::Entity, _>(&txn, id.into_inner()).await?;
        let team = self
            .hydrator
            .hydrate_one(&txn, team.map(TeamRecord::from))
            .await?;

        txn.commit().await?;
        Ok(team)
    }

    /// Lists teams ordered by name, each with its members.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn list(
        &self,
        request: PageRequest,
    ) -> Result<PageResponse<TeamRecord>, RepositoryError> {
        let txn = storage::begin_snapshot(&self.db).await?;

        let (rows, total) =
            storage::get_page::<teams::Entity, _>(&txn, teams::Column::Name, request).await?;
        let page = PageResponse::for_request(rows, request, total).map(TeamRecord::from);
        let page = self.hydrator.hydrate_page(&txn, page).await?;

        txn.commit().await?;
        Ok(page)
    }
}

impl std::fmt::Debug for TeamRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamRepository")
            .field("hydrator", &self.hydrator)
            .finish_non_exhaustive()
    }
}
