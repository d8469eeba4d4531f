//! `SeaORM` Entity for trainings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "trainings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Months a completion stays valid; `None` never expires.
    pub validity_months: Option<i32>,
    pub created_by: String,
    pub modified_by: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::employee_trainings::Entity")]
    EmployeeTrainings,
}

impl Related<super::employee_trainings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeTrainings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
