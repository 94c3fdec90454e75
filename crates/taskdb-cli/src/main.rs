use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;

use cli::Cli;
use taskdb_core::TaskRepository;
use taskdb_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before clap reads its env fallbacks
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(cli.log_json);

    run(cli).await
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskdb=info,taskdb_core=info,taskdb_db=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr; stdout carries command output
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = db_config(&cli)?;
    tracing::debug!(
        "Using database {} (collection: {})",
        config.database,
        config.collection
    );

    let db = Database::connect(&config).await?;
    let repo = TaskRepository::new(Arc::new(db.tasks()));

    commands::execute(cli.command, &db, &repo).await
}

fn db_config(cli: &Cli) -> Result<DbConfig> {
    let mut config = match &cli.mongodb_uri {
        Some(uri) => DbConfig::new(uri.clone()),
        None => DbConfig::from_env().context("MONGODB_URI must be set (flag, env or .env)")?,
    };

    if let Some(database) = &cli.database {
        config.database = database.clone();
    }
    if let Some(collection) = &cli.collection {
        config.collection = collection.clone();
    }

    Ok(config)
}
