//! Entity re-exports.

pub use super::employee_safety_instructions::Entity as EmployeeSafetyInstructions;
pub use super::employee_trainings::Entity as EmployeeTrainings;
pub use super::employees::Entity as Employees;
pub use super::safety_instructions::Entity as SafetyInstructions;
pub use super::teams::Entity as Teams;
pub use super::trainings::Entity as Trainings;
