//! Hydrated parent records and their association fetchers.
//!
//! Every fetcher reads only the child side of one association (the link
//! table plus the catalog row it points at, or the child table itself),
//! filtered by `IN` on the parent foreign key. The parent table is never
//! joined, so pagination counts over parents stay exact.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use roster_core::hydration::{
    AssociationRegistry, BatchFetch, FetchError, Hydratable, HydrationError, HydrationMetrics,
    HydrationOptions, Hydrator, NoopMetrics, Slot,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{
    employee_safety_instructions, employee_trainings, employees, safety_instructions, teams,
    trainings,
};
use crate::storage;

/// Association name for an employee's completed trainings.
pub const TRAININGS: &str = "trainings";
/// Association name for an employee's acknowledged safety instructions.
pub const SAFETY_INSTRUCTIONS: &str = "safety_instructions";
/// Association name for a team's members.
pub const MEMBERS: &str = "members";

/// A training an employee has completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedTraining {
    /// The training course.
    pub training: trainings::Model,
    /// Completion date.
    pub completed_on: NaiveDate,
    /// Expiry of the certification, if the training expires.
    pub valid_until: Option<NaiveDate>,
}

/// A safety instruction an employee has acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcknowledgedInstruction {
    /// The instruction as currently stored.
    pub instruction: safety_instructions::Model,
    /// Version that was acknowledged.
    pub acknowledged_version: i32,
    /// When it was acknowledged.
    pub acknowledged_at: DateTimeWithTimeZone,
}

impl AcknowledgedInstruction {
    /// Returns true if the instruction changed after it was acknowledged.
    #[must_use]
    pub const fn is_outdated(&self) -> bool {
        self.acknowledged_version < self.instruction.version
    }
}

/// Employee with its trainings and safety instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeRecord {
    /// The employee row.
    #[serde(flatten)]
    pub employee: employees::Model,
    /// Completed trainings, oldest completion first.
    pub trainings: Slot<CompletedTraining>,
    /// Acknowledged safety instructions, oldest acknowledgement first.
    pub safety_instructions: Slot<AcknowledgedInstruction>,
}

impl From<employees::Model> for EmployeeRecord {
    fn from(employee: employees::Model) -> Self {
        Self {
            employee,
            trainings: Slot::Unloaded,
            safety_instructions: Slot::Unloaded,
        }
    }
}

impl Hydratable for EmployeeRecord {
    type Id = Uuid;
    const TYPE_NAME: &'static str = "employee";

    fn id(&self) -> Uuid {
        self.employee.id
    }
}

/// Team with its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamRecord {
    /// The team row.
    #[serde(flatten)]
    pub team: teams::Model,
    /// Members ordered by last name.
    pub members: Slot<employees::Model>,
}

impl From<teams::Model> for TeamRecord {
    fn from(team: teams::Model) -> Self {
        Self {
            team,
            members: Slot::Unloaded,
        }
    }
}

impl Hydratable for TeamRecord {
    type Id = Uuid;
    const TYPE_NAME: &'static str = "team";

    fn id(&self) -> Uuid {
        self.team.id
    }
}

/// Loads completed trainings for a batch of employees.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmployeeTrainingsFetcher;

#[async_trait]
impl BatchFetch<DatabaseTransaction, Uuid, CompletedTraining> for EmployeeTrainingsFetcher {
    async fn fetch(
        &self,
        txn: &DatabaseTransaction,
        ids: &[Uuid],
    ) -> Result<Vec<(Uuid, CompletedTraining)>, FetchError> {
        let rows = employee_trainings::Entity::find()
            .filter(employee_trainings::Column::EmployeeId.is_in(ids.iter().copied()))
            .find_also_related(trainings::Entity)
            .order_by_asc(employee_trainings::Column::CompletedOn)
            .order_by_asc(employee_trainings::Column::TrainingId)
            .all(txn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(link, training)| {
                training.map(|training| {
                    (
                        link.employee_id,
                        CompletedTraining {
                            training,
                            completed_on: link.completed_on,
                            valid_until: link.valid_until,
                        },
                    )
                })
            })
            .collect())
    }
}

/// Loads acknowledged safety instructions for a batch of employees.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmployeeSafetyInstructionsFetcher;

#[async_trait]
impl BatchFetch<DatabaseTransaction, Uuid, AcknowledgedInstruction>
    for EmployeeSafetyInstructionsFetcher
{
    async fn fetch(
        &self,
        txn: &DatabaseTransaction,
        ids: &[Uuid],
    ) -> Result<Vec<(Uuid, AcknowledgedInstruction)>, FetchError> {
        let rows = employee_safety_instructions::Entity::find()
            .filter(employee_safety_instructions::Column::EmployeeId.is_in(ids.iter().copied()))
            .find_also_related(safety_instructions::Entity)
            .order_by_asc(employee_safety_instructions::Column::AcknowledgedAt)
            .order_by_asc(employee_safety_instructions::Column::SafetyInstructionId)
            .all(txn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(link, instruction)| {
                instruction.map(|instruction| {
                    (
                        link.employee_id,
                        AcknowledgedInstruction {
                            instruction,
                            acknowledged_version: link.acknowledged_version,
                            acknowledged_at: link.acknowledged_at,
                        },
                    )
                })
            })
            .collect())
    }
}

/// Loads the members of a batch of teams.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeamMembersFetcher;

#[async_trait]
impl BatchFetch<DatabaseTransaction, Uuid, employees::Model> for TeamMembersFetcher {
    async fn fetch(
        &self,
        txn: &DatabaseTransaction,
        ids: &[Uuid],
    ) -> Result<Vec<(Uuid, employees::Model)>, FetchError> {
        let members = storage::query_children_by_parent_ids::<employees::Entity, _>(
            txn,
            employees::Column::TeamId,
            ids,
            employees::Column::LastName,
            |employee| employee.team_id,
        )
        .await?;
        Ok(members)
    }
}

/// Declares the `trainings` and `safety_instructions` associations.
///
/// # Errors
///
/// Fails only on a duplicate association name.
pub fn employee_registry()
-> Result<AssociationRegistry<EmployeeRecord, DatabaseTransaction>, HydrationError> {
    AssociationRegistry::new()
        .with(
            TRAININGS,
            EmployeeTrainingsFetcher,
            |employee: &mut EmployeeRecord, trainings| {
                employee.trainings.set(trainings);
            },
        )?
        .with(
            SAFETY_INSTRUCTIONS,
            EmployeeSafetyInstructionsFetcher,
            |employee: &mut EmployeeRecord, instructions| {
                employee.safety_instructions.set(instructions);
            },
        )
}

/// Declares the `members` association.
///
/// # Errors
///
/// Fails only on a duplicate association name.
pub fn team_registry()
-> Result<AssociationRegistry<TeamRecord, DatabaseTransaction>, HydrationError> {
    AssociationRegistry::new().with(
        MEMBERS,
        TeamMembersFetcher,
        |team: &mut TeamRecord, members| {
            team.members.set(members);
        },
    )
}

/// The hydrators for every parent type, built once at startup.
#[derive(Debug, Clone)]
pub struct Hydrators {
    /// Hydrates employees.
    pub employees: Hydrator<EmployeeRecord, DatabaseTransaction>,
    /// Hydrates teams.
    pub teams: Hydrator<TeamRecord, DatabaseTransaction>,
}

impl Hydrators {
    /// Builds all registries and wraps them in hydrators.
    ///
    /// # Errors
    ///
    /// Returns `HydrationError::DuplicateAssociation` if a registry is
    /// declared inconsistently. Treat this as a startup failure.
    pub fn new(
        options: HydrationOptions,
        metrics: Arc<dyn HydrationMetrics>,
    ) -> Result<Self, HydrationError> {
        Ok(Self {
            employees: Hydrator::new(Arc::new(employee_registry()?))
                .with_options(options)
                .with_metrics(Arc::clone(&metrics)),
            teams: Hydrator::new(Arc::new(team_registry()?))
                .with_options(options)
                .with_metrics(metrics),
        })
    }

    /// Sequential hydrators without metrics.
    ///
    /// # Errors
    ///
    /// See [`Hydrators::new`].
    pub fn with_defaults() -> Result<Self, HydrationError> {
        Self::new(HydrationOptions::default(), Arc::new(NoopMetrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registries_declare_associations_in_order() {
        let employees = employee_registry().unwrap();
        assert_eq!(
            employees.association_names().collect::<Vec<_>>(),
            vec![TRAININGS, SAFETY_INSTRUCTIONS]
        );

        let teams = team_registry().unwrap();
        assert_eq!(teams.association_names().collect::<Vec<_>>(), vec![MEMBERS]);
    }

    #[test]
    fn test_registering_trainings_twice_fails() {
        let err = employee_registry()
            .unwrap()
            .with(TRAININGS, EmployeeTrainingsFetcher, |e: &mut EmployeeRecord, t| {
                e.trainings.set(t);
            })
            .unwrap_err();

        assert_eq!(err.association(), TRAININGS);
        assert_eq!(err.error_code(), "DUPLICATE_ASSOCIATION");
    }

    #[test]
    fn test_outdated_acknowledgement() {
        let now = chrono::Utc::now().into();
        let instruction = safety_instructions::Model {
            id: Uuid::new_v4(),
            title: "Ladder use".to_string(),
            content: "Three points of contact.".to_string(),
            version: 3,
            created_by: "system".to_string(),
            modified_by: "system".to_string(),
            created_at: now,
            updated_at: now,
        };

        let mut ack = AcknowledgedInstruction {
            instruction,
            acknowledged_version: 2,
            acknowledged_at: now,
        };
        assert!(ack.is_outdated());

        ack.acknowledged_version = 3;
        assert!(!ack.is_outdated());
    }
}
