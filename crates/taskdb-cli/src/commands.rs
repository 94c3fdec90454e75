use anyhow::Result;
use serde::Serialize;

use crate::cli::Commands;
use taskdb_core::{TaskFilter, TaskRepository};
use taskdb_db::Database;

pub async fn execute(command: Commands, db: &Database, repo: &TaskRepository) -> Result<()> {
    match command {
        Commands::List { status, title } => {
            let filter = TaskFilter { status, title };
            let tasks = repo.list(&filter).await?;
            print_json(&tasks)?;
        }

        Commands::Get { id } => match repo.get_by_id(&id).await? {
            Some(task) => print_json(&task)?,
            None => println!("Task not found: {}", id),
        },

        Commands::Create { fields } => {
            let task = repo.create(fields.into_task_fields()?).await?;
            print_json(&task)?;
        }

        Commands::Update { id, fields } => {
            match repo.update(&id, fields.into_task_fields()?).await? {
                Some(task) => print_json(&task)?,
                None => println!("Task not found: {}", id),
            }
        }

        Commands::Delete { id } => {
            if repo.delete(&id).await? {
                println!("✓ Task deleted: {}", id);
            } else {
                println!("Task not found: {}", id);
            }
        }

        Commands::Ping => {
            db.ping().await?;
            let config = db.config();
            println!(
                "✓ Database reachable ({}.{})",
                config.database, config.collection
            );
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
