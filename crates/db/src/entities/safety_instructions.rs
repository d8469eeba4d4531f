//! `SeaORM` Entity for safety_instructions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "safety_instructions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub version: i32,
    pub created_by: String,
    pub modified_by: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::employee_safety_instructions::Entity")]
    EmployeeSafetyInstructions,
}

impl Related<super::employee_safety_instructions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeSafetyInstructions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
