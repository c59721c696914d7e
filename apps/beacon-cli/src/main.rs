//! Beacon CLI
//!
//! Runs deployment plans against an in-process beacon registry.
//!
//! # Usage
//!
//! ```bash
//! # List built-in implementation artifacts
//! beacon catalog
//!
//! # Run a plan, persisting registry state after every batch
//! beacon run plans/two-module-lifecycle.yaml --state-file /tmp/beacon.json
//!
//! # Show a persisted state file
//! beacon inspect /tmp/beacon.json
//!
//! # Environment overrides nested config keys
//! BEACON_BEACON__MAX_BATCH_SIZE=8 beacon run plans/two-module-lifecycle.yaml
//! ```

mod catalog;
mod config;
mod plan;

use anyhow::{Context, Result};
use beacon_registry::infra::storage::entity::PersistedState;
use beacon_registry::{
    BeaconModule, InMemoryStateRepository, JsonFileStateRepository, StateRepository,
};
use clap::{Parser, Subcommand};
use config::{AppConfig, LoggingConfig};
use plan::{Plan, PlanRunner};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "beacon", version, about = "Upgradeable module registry")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List implementation artifacts available to plans
    Catalog,
    /// Execute a deployment plan
    Run {
        plan: PathBuf,
        /// Persist registry state to this JSON file
        #[arg(long)]
        state_file: Option<PathBuf>,
    },
    /// Print a persisted state file
    Inspect { state_file: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    init_logging(&config.logging);

    match cli.command {
        Command::Catalog => {
            for artifact in catalog::artifacts() {
                println!("{:<10} {}", artifact.name, artifact.description);
            }
            Ok(())
        }
        Command::Run { plan, state_file } => {
            if state_file.is_some() {
                config.state_file = state_file;
            }
            run_plan(&config, &plan)
        }
        Command::Inspect { state_file } => inspect(&state_file),
    }
}

fn init_logging(logging: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    // stdout carries plan results
    if logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run_plan(config: &AppConfig, path: &std::path::Path) -> Result<()> {
    let plan = Plan::load(path)?;

    let repository: Arc<dyn StateRepository> = match &config.state_file {
        Some(state_file) => {
            tracing::info!(path = %state_file.display(), "persisting beacon state");
            Arc::new(JsonFileStateRepository::new(state_file))
        }
        None => Arc::new(InMemoryStateRepository::new()),
    };

    let module = BeaconModule::default();
    let beacon = module.init(config.beacon.clone(), repository)?;

    let mut runner = PlanRunner::new(beacon);
    let outcomes = runner
        .run(&plan)
        .with_context(|| format!("plan {} aborted", path.display()))?;
    for (index, outcome) in outcomes.iter().enumerate() {
        println!("{:>3}. {}", index + 1, outcome);
    }

    let client = module.client()?;
    println!(
        "contracts version {}, settings version {}",
        client.get_contracts_version(),
        client.get_settings_version()
    );
    Ok(())
}

fn inspect(path: &std::path::Path) -> Result<()> {
    let snapshot = JsonFileStateRepository::new(path)
        .load()?
        .with_context(|| format!("no state stored at {}", path.display()))?;
    let persisted = PersistedState::from(&snapshot);
    print!("{}", serde_yaml::to_string(&persisted)?);
    Ok(())
}
