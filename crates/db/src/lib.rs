//! Database layer with `SeaORM` entities, association fetchers, and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Generic storage helpers (point, batch, and paged lookups)
//! - Hydrated parent records and their batch fetchers
//! - Repository abstractions for data access
//! - Database migrations

pub mod entities;
pub mod hydration;
pub mod migration;
pub mod repositories;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

pub use hydration::{EmployeeRecord, Hydrators, TeamRecord};
pub use repositories::{
    EmployeeRepository, RepositoryError, SafetyInstructionRepository, TeamRepository,
    TrainingRepository,
};

use roster_core::audit::AuditorProvider;
use roster_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection sized from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    Database::connect(options).await
}

/// Every repository, sharing one connection pool, auditor, and set of
/// hydrators.
#[derive(Debug, Clone)]
pub struct Repositories {
    /// Employees, hydrated with trainings and safety instructions.
    pub employees: EmployeeRepository,
    /// Teams, hydrated with members.
    pub teams: TeamRepository,
    /// Training catalog.
    pub trainings: TrainingRepository,
    /// Safety instruction catalog.
    pub safety_instructions: SafetyInstructionRepository,
}

impl Repositories {
    /// Wires up every repository.
    #[must_use]
    pub fn new(
        db: &DatabaseConnection,
        auditor: &Arc<dyn AuditorProvider>,
        hydrators: Hydrators,
    ) -> Self {
        Self {
            employees: EmployeeRepository::new(db.clone(), Arc::clone(auditor), hydrators.employees),
            teams: TeamRepository::new(db.clone(), Arc::clone(auditor), hydrators.teams),
            trainings: TrainingRepository::new(db.clone(), Arc::clone(auditor)),
            safety_instructions: SafetyInstructionRepository::new(db.clone(), Arc::clone(auditor)),
        }
    }
}
