//! `SeaORM` Entity for employee_safety_instructions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "employee_safety_instructions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub employee_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub safety_instruction_id: Uuid,
    /// Instruction version the employee acknowledged.
    pub acknowledged_version: i32,
    pub acknowledged_at: DateTimeWithTimeZone,
    pub created_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::EmployeeId",
        to = "super::employees::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Employees,
    #[sea_orm(
        belongs_to = "super::safety_instructions::Entity",
        from = "Column::SafetyInstructionId",
        to = "super::safety_instructions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    SafetyInstructions,
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl Related<super::safety_instructions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SafetyInstructions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
