//! Employee repository.
//!
//! Reads return [`EmployeeRecord`]s with trainings and safety instructions
//! hydrated. The parent lookup and both association fetches share one
//! read-only snapshot, so a record never mixes data from two points in time.

use std::sync::Arc;

use chrono::{Months, NaiveDate};
use roster_core::audit::AuditorProvider;
use roster_core::hydration::Hydrator;
use roster_shared::types::{
    EmployeeId, PageRequest, PageResponse, SafetyInstructionId, TeamId, TrainingId,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use super::error::{RepositoryError, require_non_blank};
use crate::entities::{
    employee_safety_instructions, employee_trainings, employees, safety_instructions, teams,
    trainings,
};
use crate::hydration::EmployeeRecord;
use crate::storage;

/// Input for creating an employee.
#[derive(Debug, Clone)]
pub struct CreateEmployeeInput {
    /// Team the employee belongs to.
    pub team_id: Option<TeamId>,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address, unique.
    pub email: String,
    /// Job title.
    pub job_title: Option<String>,
}

/// Input for updating an employee.
#[derive(Debug, Clone, Default)]
pub struct UpdateEmployeeInput {
    /// Team, or `Some(None)` to remove the employee from their team.
    pub team_id: Option<Option<TeamId>>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Job title.
    pub job_title: Option<Option<String>>,
}

/// Computes when a completion expires. `None` means it never does.
///
/// # Errors
///
/// Returns a validation error for a negative validity or a date past the
/// calendar's range.
pub fn valid_until(
    completed_on: NaiveDate,
    validity_months: Option<i32>,
) -> Result<Option<NaiveDate>, RepositoryError> {
    let Some(months) = validity_months else {
        return Ok(None);
    };

    let months = u32::try_from(months)
        .map_err(|_| RepositoryError::Validation(format!("Invalid validity of {months} months")))?;
    completed_on
        .checked_add_months(Months::new(months))
        .map(Some)
        .ok_or_else(|| {
            RepositoryError::Validation(format!("{completed_on} + {months} months is out of range"))
        })
}

fn validate_email(email: &str) -> Result<(), RepositoryError> {
    require_non_blank("email", email)?;
    if !email.contains('@') {
        return Err(RepositoryError::Validation(format!("Invalid email '{email}'")));
    }
    Ok(())
}

/// Employee repository for CRUD operations and training records.
#[derive(Clone)]
pub struct EmployeeRepository {
    db: DatabaseConnection,
    auditor: Arc<dyn AuditorProvider>,
    hydrator: Hydrator<EmployeeRecord, DatabaseTransaction>,
}

impl EmployeeRepository {
    /// Creates a new employee repository.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        auditor: Arc<dyn AuditorProvider>,
        hydrator: Hydrator<EmployeeRecord, DatabaseTransaction>,
    ) -> Self {
        Self {
            db,
            auditor,
            hydrator,
        }
    }

    async fn ensure_email_available(
        &self,
        email: &str,
        except: Option<Uuid>,
    ) -> Result<(), RepositoryError> {
        let mut query = employees::Entity::find().filter(employees::Column::Email.eq(email));
        if let Some(id) = except {
            query = query.filter(employees::Column::Id.ne(id));
        }

        if query.one(&self.db).await?.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "Email '{email}' is already in use"
            )));
        }
        Ok(())
    }

    async fn ensure_team_exists(&self, team_id: TeamId) -> Result<(), RepositoryError> {
        storage::get_by_id::<teams::Entity, _>(&self.db, team_id.into_inner())
            .await?
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("team", team_id.into_inner()))
    }

    /// Creates an employee.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A name is blank or the email is malformed
    /// - The email is already in use
    /// - The team does not exist
    pub async fn create(
        &self,
        input: CreateEmployeeInput,
    ) -> Result<employees::Model, RepositoryError> {
        require_non_blank("first_name", &input.first_name)?;
        require_non_blank("last_name", &input.last_name)?;
        validate_email(&input.email)?;
        self.ensure_email_available(&input.email, None).await?;
        if let Some(team_id) = input.team_id {
            self.ensure_team_exists(team_id).await?;
        }

        let principal = self.auditor.current_auditor();
        let now = chrono::Utc::now().into();
        let employee = employees::ActiveModel {
            id: Set(EmployeeId::new().into_inner()),
            team_id: Set(input.team_id.map(TeamId::into_inner)),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email),
            job_title: Set(input.job_title),
            created_by: Set(principal.clone()),
            modified_by: Set(principal),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(
            employee_id = %employee.id,
            team_id = ?employee.team_id,
            created_by = %employee.created_by,
            "Created employee"
        );
        Ok(employee)
    }

    /// Updates an employee.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The employee or the new team does not exist
    /// - The new email is malformed or already in use
    /// - A new name is blank
    pub async fn update(
        &self,
        id: EmployeeId,
        input: UpdateEmployeeInput,
    ) -> Result<employees::Model, RepositoryError> {
        let id = id.into_inner();
        let employee = storage::get_by_id::<employees::Entity, _>(&self.db, id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("employee", id))?;

        if let Some(first_name) = &input.first_name {
            require_non_blank("first_name", first_name)?;
        }
        if let Some(last_name) = &input.last_name {
            require_non_blank("last_name", last_name)?;
        }
        if let Some(email) = &input.email
            && *email != employee.email
        {
            validate_email(email)?;
            self.ensure_email_available(email, Some(id)).await?;
        }
        if let Some(Some(team_id)) = input.team_id {
            self.ensure_team_exists(team_id).await?;
        }

        let mut active: employees::ActiveModel = employee.into();
        if let Some(team_id) = input.team_id {
            active.team_id = Set(team_id.map(TeamId::into_inner));
        }
        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(job_title) = input.job_title {
            active.job_title = Set(job_title);
        }
        active.modified_by = Set(self.auditor.current_auditor());
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        info!(employee_id = %updated.id, modified_by = %updated.modified_by, "Updated employee");
        Ok(updated)
    }

    /// Deletes an employee with their training and acknowledgement records.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the employee does not exist.
    pub async fn delete(&self, id: EmployeeId) -> Result<(), RepositoryError> {
        let id = id.into_inner();
        let txn = self.db.begin().await?;

        employee_trainings::Entity::delete_many()
            .filter(employee_trainings::Column::EmployeeId.eq(id))
            .exec(&txn)
            .await?;
        employee_safety_instructions::Entity::delete_many()
            .filter(employee_safety_instructions::Column::EmployeeId.eq(id))
            .exec(&txn)
            .await?;
        let result = employees::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("employee", id));
        }
        txn.commit().await?;

        info!(employee_id = %id, deleted_by = %self.auditor.current_auditor(), "Deleted employee");
        Ok(())
    }

    /// Finds an employee by ID, hydrated.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn find_by_id(
        &self,
        id: EmployeeId,
    ) -> Result<Option<EmployeeRecord>, RepositoryError> {
        let txn = storage::begin_snapshot(&self.db).await?;

        let employee = storage::get_by_id::<employees::Entity, _>(&txn, id.into_inner()).await?;
        let employee = self
            .hydrator
            .hydrate_one(&txn, employee.map(EmployeeRecord::from))
            .await?;

        txn.commit().await?;
        Ok(employee)
    }

    /// Finds employees by ID, hydrated, in the order of `ids`.
    ///
    /// Unknown ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn find_by_ids(
        &self,
        ids: &[EmployeeId],
    ) -> Result<Vec<EmployeeRecord>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        let txn = storage::begin_snapshot(&self.db).await?;

        let rows = storage::get_by_ids::<employees::Entity, _>(
            &txn,
            employees::Column::Id,
            &ids,
            |employee| employee.id,
        )
        .await?;
        let employees = self
            .hydrator
            .hydrate_list(&txn, rows.into_iter().map(EmployeeRecord::from).collect())
            .await?;

        txn.commit().await?;
        Ok(employees)
    }

    /// Lists employees ordered by last name, hydrated.
    ///
    /// The total counts employees only; child rows never inflate it.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn list(
        &self,
        request: PageRequest,
    ) -> Result<PageResponse<EmployeeRecord>, RepositoryError> {
        let txn = storage::begin_snapshot(&self.db).await?;

        let (rows, total) =
            storage::get_page::<employees::Entity, _>(&txn, employees::Column::LastName, request)
                .await?;
        let page = PageResponse::for_request(rows, request, total).map(EmployeeRecord::from);
        let page = self.hydrator.hydrate_page(&txn, page).await?;

        txn.commit().await?;
        Ok(page)
    }

    /// Records that an employee completed a training.
    ///
    /// The expiry is derived from the training's validity.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The employee or training does not exist
    /// - The completion is already recorded
    pub async fn assign_training(
        &self,
        employee_id: EmployeeId,
        training_id: TrainingId,
        completed_on: NaiveDate,
    ) -> Result<employee_trainings::Model, RepositoryError> {
        let employee_id = employee_id.into_inner();
        let training_id = training_id.into_inner();

        storage::get_by_id::<employees::Entity, _>(&self.db, employee_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("employee", employee_id))?;
        let training = storage::get_by_id::<trainings::Entity, _>(&self.db, training_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("training", training_id))?;

        let existing = employee_trainings::Entity::find_by_id((employee_id, training_id))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "Training '{}' is already recorded for employee {employee_id}",
                training.title
            )));
        }

        let link = employee_trainings::ActiveModel {
            employee_id: Set(employee_id),
            training_id: Set(training_id),
            completed_on: Set(completed_on),
            valid_until: Set(valid_until(completed_on, training.validity_months)?),
            created_by: Set(self.auditor.current_auditor()),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        info!(
            employee_id = %employee_id,
            training_id = %training_id,
            valid_until = ?link.valid_until,
            created_by = %link.created_by,
            "Recorded training completion"
        );
        Ok(link)
    }

    /// Records that an employee acknowledged the current version of a
    /// safety instruction. Acknowledging again moves the record to the
    /// current version.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the employee or instruction does not exist.
    pub async fn acknowledge_instruction(
        &self,
        employee_id: EmployeeId,
        instruction_id: SafetyInstructionId,
    ) -> Result<employee_safety_instructions::Model, RepositoryError> {
        let employee_id = employee_id.into_inner();
        let instruction_id = instruction_id.into_inner();

        storage::get_by_id::<employees::Entity, _>(&self.db, employee_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("employee", employee_id))?;
        let instruction =
            storage::get_by_id::<safety_instructions::Entity, _>(&self.db, instruction_id)
                .await?
                .ok_or_else(|| RepositoryError::not_found("safety instruction", instruction_id))?;

        let principal = self.auditor.current_auditor();
        let now = chrono::Utc::now().into();
        let existing =
            employee_safety_instructions::Entity::find_by_id((employee_id, instruction_id))
                .one(&self.db)
                .await?;

        let link = match existing {
            Some(existing) => {
                let mut active: employee_safety_instructions::ActiveModel = existing.into();
                active.acknowledged_version = Set(instruction.version);
                active.acknowledged_at = Set(now);
                active.created_by = Set(principal);
                active.update(&self.db).await?
            }
            None => {
                employee_safety_instructions::ActiveModel {
                    employee_id: Set(employee_id),
                    safety_instruction_id: Set(instruction_id),
                    acknowledged_version: Set(instruction.version),
                    acknowledged_at: Set(now),
                    created_by: Set(principal),
                }
                .insert(&self.db)
                .await?
            }
        };

        info!(
            employee_id = %employee_id,
            instruction_id = %instruction_id,
            version = link.acknowledged_version,
            acknowledged_by = %link.created_by,
            "Recorded safety instruction acknowledgement"
        );
        Ok(link)
    }
}

impl std::fmt::Debug for EmployeeRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmployeeRepository")
            .field("hydrator", &self.hydrator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(date(2026, 1, 15), None, None)]
    #[case(date(2026, 1, 15), Some(12), Some(date(2027, 1, 15)))]
    #[case(date(2026, 1, 31), Some(1), Some(date(2026, 2, 28)))]
    #[case(date(2024, 2, 29), Some(12), Some(date(2025, 2, 28)))]
    fn test_valid_until(
        #[case] completed_on: NaiveDate,
        #[case] months: Option<i32>,
        #[case] expected: Option<NaiveDate>,
    ) {
        assert_eq!(valid_until(completed_on, months).unwrap(), expected);
    }

    #[test]
    fn test_valid_until_rejects_negative_validity() {
        assert!(matches!(
            valid_until(date(2026, 1, 1), Some(-1)),
            Err(RepositoryError::Validation(_))
        ));
    }

    #[rstest]
    #[case("ana@example.com", true)]
    #[case("", false)]
    #[case("not-an-email", false)]
    fn test_validate_email(#[case] email: &str, #[case] ok: bool) {
        assert_eq!(validate_email(email).is_ok(), ok);
    }
}
