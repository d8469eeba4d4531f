//! Initial database migration.
//!
//! Creates the staff tables, the two employee link tables, and the foreign
//! key indexes the association fetchers filter on. Built with the schema
//! builder so it runs on Postgres and SQLite alike.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // PART 1: CATALOG TABLES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Teams::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Teams::Name).string_len(200).not_null().unique_key())
                    .col(ColumnDef::new(Teams::Description).text())
                    .col(ColumnDef::new(Teams::CreatedBy).string_len(100).not_null())
                    .col(ColumnDef::new(Teams::ModifiedBy).string_len(100).not_null())
                    .col(ColumnDef::new(Teams::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Teams::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Trainings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Trainings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Trainings::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Trainings::Description).text())
                    .col(ColumnDef::new(Trainings::ValidityMonths).integer())
                    .col(ColumnDef::new(Trainings::CreatedBy).string_len(100).not_null())
                    .col(ColumnDef::new(Trainings::ModifiedBy).string_len(100).not_null())
                    .col(ColumnDef::new(Trainings::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Trainings::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SafetyInstructions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SafetyInstructions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SafetyInstructions::Title).string_len(200).not_null())
                    .col(ColumnDef::new(SafetyInstructions::Content).text().not_null())
                    .col(
                        ColumnDef::new(SafetyInstructions::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(SafetyInstructions::CreatedBy).string_len(100).not_null())
                    .col(ColumnDef::new(SafetyInstructions::ModifiedBy).string_len(100).not_null())
                    .col(
                        ColumnDef::new(SafetyInstructions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SafetyInstructions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 2: EMPLOYEES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Employees::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Employees::TeamId).uuid())
                    .col(ColumnDef::new(Employees::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Employees::LastName).string_len(100).not_null())
                    .col(ColumnDef::new(Employees::Email).string_len(255).not_null().unique_key())
                    .col(ColumnDef::new(Employees::JobTitle).string_len(200))
                    .col(ColumnDef::new(Employees::CreatedBy).string_len(100).not_null())
                    .col(ColumnDef::new(Employees::ModifiedBy).string_len(100).not_null())
                    .col(ColumnDef::new(Employees::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Employees::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_team")
                            .from(Employees::Table, Employees::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_employees_team")
                    .table(Employees::Table)
                    .col(Employees::TeamId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 3: EMPLOYEE LINK TABLES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(EmployeeTrainings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EmployeeTrainings::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(EmployeeTrainings::TrainingId).uuid().not_null())
                    .col(ColumnDef::new(EmployeeTrainings::CompletedOn).date().not_null())
                    .col(ColumnDef::new(EmployeeTrainings::ValidUntil).date())
                    .col(ColumnDef::new(EmployeeTrainings::CreatedBy).string_len(100).not_null())
                    .col(
                        ColumnDef::new(EmployeeTrainings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(EmployeeTrainings::EmployeeId)
                            .col(EmployeeTrainings::TrainingId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_trainings_employee")
                            .from(EmployeeTrainings::Table, EmployeeTrainings::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_trainings_training")
                            .from(EmployeeTrainings::Table, EmployeeTrainings::TrainingId)
                            .to(Trainings::Table, Trainings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmployeeSafetyInstructions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmployeeSafetyInstructions::EmployeeId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmployeeSafetyInstructions::SafetyInstructionId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmployeeSafetyInstructions::AcknowledgedVersion)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmployeeSafetyInstructions::AcknowledgedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmployeeSafetyInstructions::CreatedBy)
                            .string_len(100)
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(EmployeeSafetyInstructions::EmployeeId)
                            .col(EmployeeSafetyInstructions::SafetyInstructionId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_safety_instructions_employee")
                            .from(
                                EmployeeSafetyInstructions::Table,
                                EmployeeSafetyInstructions::EmployeeId,
                            )
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_safety_instructions_instruction")
                            .from(
                                EmployeeSafetyInstructions::Table,
                                EmployeeSafetyInstructions::SafetyInstructionId,
                            )
                            .to(SafetyInstructions::Table, SafetyInstructions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmployeeSafetyInstructions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EmployeeTrainings::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Employees::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SafetyInstructions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Trainings::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Teams {
    Table,
    Id,
    Name,
    Description,
    CreatedBy,
    ModifiedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
    TeamId,
    FirstName,
    LastName,
    Email,
    JobTitle,
    CreatedBy,
    ModifiedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Trainings {
    Table,
    Id,
    Title,
    Description,
    ValidityMonths,
    CreatedBy,
    ModifiedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SafetyInstructions {
    Table,
    Id,
    Title,
    Content,
    Version,
    CreatedBy,
    ModifiedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EmployeeTrainings {
    Table,
    EmployeeId,
    TrainingId,
    CompletedOn,
    ValidUntil,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EmployeeSafetyInstructions {
    Table,
    EmployeeId,
    SafetyInstructionId,
    AcknowledgedVersion,
    AcknowledgedAt,
    CreatedBy,
}
