//! Shared fixtures for the SQLite-backed integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use roster_core::audit::{AuditorProvider, TaskLocalAuditor};
use roster_core::hydration::{CountingMetrics, HydrationOptions};
use roster_db::entities::{employees, safety_instructions, teams, trainings};
use roster_db::migration::Migrator;
use roster_db::repositories::{
    CreateEmployeeInput, CreateSafetyInstructionInput, CreateTeamInput, CreateTrainingInput,
};
use roster_db::{Hydrators, Repositories};
use roster_shared::types::TeamId;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

/// A migrated in-memory database with every repository wired up.
pub struct TestContext {
    pub db: DatabaseConnection,
    pub repos: Repositories,
    pub metrics: Arc<CountingMetrics>,
}

/// In-memory SQLite lives per connection, so the pool is pinned to one.
pub async fn connect() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn setup_with(options: HydrationOptions) -> TestContext {
    let db = connect().await;
    let metrics = Arc::new(CountingMetrics::default());
    let hydrators = Hydrators::new(options, metrics.clone()).unwrap();
    let auditor: Arc<dyn AuditorProvider> = Arc::new(TaskLocalAuditor::default());
    let repos = Repositories::new(&db, &auditor, hydrators);

    TestContext { db, repos, metrics }
}

pub async fn setup() -> TestContext {
    setup_with(HydrationOptions::default()).await
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn team(ctx: &TestContext, name: &str) -> teams::Model {
    ctx.repos
        .teams
        .create(CreateTeamInput {
            name: name.to_string(),
            description: None,
        })
        .await
        .unwrap()
}

pub async fn employee(
    ctx: &TestContext,
    first_name: &str,
    last_name: &str,
    team: Option<&teams::Model>,
) -> employees::Model {
    ctx.repos
        .employees
        .create(CreateEmployeeInput {
            team_id: team.map(|t| TeamId::from_uuid(t.id)),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: format!(
                "{}.{}@example.com",
                first_name.to_lowercase(),
                last_name.to_lowercase()
            ),
            job_title: None,
        })
        .await
        .unwrap()
}

pub async fn training(ctx: &TestContext, title: &str, validity_months: Option<i32>) -> trainings::Model {
    ctx.repos
        .trainings
        .create(CreateTrainingInput {
            title: title.to_string(),
            description: None,
            validity_months,
        })
        .await
        .unwrap()
}

pub async fn instruction(ctx: &TestContext, title: &str) -> safety_instructions::Model {
    ctx.repos
        .safety_instructions
        .create(CreateSafetyInstructionInput {
            title: title.to_string(),
            content: format!("{title}: read before starting work."),
        })
        .await
        .unwrap()
}
