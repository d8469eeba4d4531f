//! Demo data seeder for Roster development.
//!
//! Applies pending migrations, seeds teams, employees, trainings, and safety
//! instructions, then logs the first hydrated page of employees and teams.
//! Seeding is skipped when teams already exist.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use chrono::{Months, Utc};
use roster_core::audit::{AuditorProvider, TaskLocalAuditor, with_principal};
use roster_core::hydration::{CountingMetrics, HydrationOptions};
use roster_db::migration::Migrator;
use roster_db::repositories::{
    CreateEmployeeInput, CreateSafetyInstructionInput, CreateTeamInput, CreateTrainingInput,
};
use roster_db::{Hydrators, Repositories, connect_with};
use roster_shared::AppConfig;
use roster_shared::types::{EmployeeId, PageRequest, SafetyInstructionId, TeamId, TrainingId};
use sea_orm_migration::MigratorTrait;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Principal recorded on seeded rows.
const SEED_PRINCIPAL: &str = "seeder";

/// (first name, last name, job title, team index)
const EMPLOYEES: [(&str, &str, &str, usize); 5] = [
    ("Ana", "Lopez", "Electrician", 0),
    ("Ben", "Okafor", "Mechanic", 0),
    ("Chen", "Wei", "Forklift driver", 1),
    ("Dana", "Ivanova", "Warehouse lead", 1),
    ("Emil", "Novak", "Mechanic", 0),
];

/// (title, validity in months)
const TRAININGS: [(&str, Option<i32>); 3] = [
    ("First aid", Some(24)),
    ("Forklift operation", Some(36)),
    ("Working at height", None),
];

const INSTRUCTIONS: [(&str, &str); 2] = [
    ("Ladder use", "Keep three points of contact and never stand on the top rung."),
    ("Hot work", "Obtain a permit and keep an extinguisher within reach."),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster=debug,seeder=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect_with(&config.database).await?;
    info!("Connected to database");
    Migrator::up(&db, None).await?;

    let metrics = Arc::new(CountingMetrics::new());
    let hydrators = Hydrators::new(HydrationOptions::from(&config.hydration), metrics.clone())?;
    let auditor: Arc<dyn AuditorProvider> =
        Arc::new(TaskLocalAuditor::new(config.audit.system_principal.clone()));
    let repos = Repositories::new(&db, &auditor, hydrators);

    let existing = repos.teams.list(PageRequest::new(1, 1)).await?;
    if existing.meta.total > 0 {
        info!(teams = existing.meta.total, "Data already present, skipping seed");
    } else {
        with_principal(SEED_PRINCIPAL, seed(&repos)).await?;
        info!("Seeding complete");
    }

    let employees = repos.employees.list(PageRequest::default()).await?;
    info!(
        total = employees.meta.total,
        page = employees.meta.page,
        "Hydrated employees:\n{}",
        serde_json::to_string_pretty(&employees)?
    );

    let teams = repos.teams.list(PageRequest::default()).await?;
    info!(
        total = teams.meta.total,
        "Hydrated teams:\n{}",
        serde_json::to_string_pretty(&teams)?
    );

    info!(
        fetches = metrics.fetches(),
        children = metrics.children(),
        orphans = metrics.orphans(),
        "Hydration counters"
    );

    Ok(())
}

async fn seed(repos: &Repositories) -> anyhow::Result<()> {
    let mut teams = Vec::new();
    for name in ["Maintenance", "Logistics"] {
        let team = repos
            .teams
            .create(CreateTeamInput {
                name: name.to_string(),
                description: None,
            })
            .await?;
        teams.push(TeamId::from_uuid(team.id));
    }

    let mut trainings = Vec::new();
    for (title, validity_months) in TRAININGS {
        let training = repos
            .trainings
            .create(CreateTrainingInput {
                title: title.to_string(),
                description: None,
                validity_months,
            })
            .await?;
        trainings.push(TrainingId::from_uuid(training.id));
    }

    let mut instructions = Vec::new();
    for (title, content) in INSTRUCTIONS {
        let instruction = repos
            .safety_instructions
            .create(CreateSafetyInstructionInput {
                title: title.to_string(),
                content: content.to_string(),
            })
            .await?;
        instructions.push(SafetyInstructionId::from_uuid(instruction.id));
    }

    let today = Utc::now().date_naive();
    for (index, (first_name, last_name, job_title, team)) in EMPLOYEES.into_iter().enumerate() {
        let employee = repos
            .employees
            .create(CreateEmployeeInput {
                team_id: teams.get(team).copied(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: format!(
                    "{}.{}@roster.dev",
                    first_name.to_lowercase(),
                    last_name.to_lowercase()
                ),
                job_title: Some(job_title.to_string()),
            })
            .await?;
        let employee_id = EmployeeId::from_uuid(employee.id);

        // Staggered so the demo data has a spread of counts per employee.
        for training in trainings.iter().skip(index % 2).take(2) {
            let completed_on = today
                .checked_sub_months(Months::new(u32::try_from(index * 4)?))
                .unwrap_or(today);
            repos
                .employees
                .assign_training(employee_id, *training, completed_on)
                .await?;
        }
        for instruction in instructions.iter().take(index % 3) {
            repos
                .employees
                .acknowledge_instruction(employee_id, *instruction)
                .await?;
        }
    }

    Ok(())
}
