//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Write operations stamp `created_by` / `modified_by` from the injected
//! [`AuditorProvider`](roster_core::audit::AuditorProvider).

pub mod employee;
pub mod error;
pub mod safety_instruction;
pub mod team;
pub mod training;

pub use employee::{CreateEmployeeInput, EmployeeRepository, UpdateEmployeeInput, valid_until};
pub use error::RepositoryError;
pub use safety_instruction::{
    CreateSafetyInstructionInput, SafetyInstructionRepository, UpdateSafetyInstructionInput,
};
pub use team::{CreateTeamInput, TeamRepository, UpdateTeamInput};
pub use training::{CreateTrainingInput, TrainingRepository, UpdateTrainingInput};
