//! `SeaORM` entity definitions.

pub mod prelude;

pub mod employee_safety_instructions;
pub mod employee_trainings;
pub mod employees;
pub mod safety_instructions;
pub mod teams;
pub mod trainings;
