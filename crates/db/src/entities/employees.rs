//! `SeaORM` Entity for employees table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub team_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub job_title: Option<String>,
    pub created_by: String,
    pub modified_by: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Teams,
    #[sea_orm(has_many = "super::employee_trainings::Entity")]
    EmployeeTrainings,
    #[sea_orm(has_many = "super::employee_safety_instructions::Entity")]
    EmployeeSafetyInstructions,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teams.def()
    }
}

impl Related<super::employee_trainings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeTrainings.def()
    }
}

impl Related<super::employee_safety_instructions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeSafetyInstructions.def()
    }
}

impl Related<super::trainings::Entity> for Entity {
    fn to() -> RelationDef {
        super::employee_trainings::Relation::Trainings.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::employee_trainings::Relation::Employees.def().rev())
    }
}

impl Related<super::safety_instructions::Entity> for Entity {
    fn to() -> RelationDef {
        super::employee_safety_instructions::Relation::SafetyInstructions.def()
    }

    fn via() -> Option<RelationDef> {
        Some(
            super::employee_safety_instructions::Relation::Employees
                .def()
                .rev(),
        )
    }
}

impl ActiveModelBehavior for ActiveModel {}
