//! taskprio - command-line client for the task-priority service.
//!
//! Tasks can be referred to by id or by their 1-based position in `list`.
//! An exact id match takes precedence over a position.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use task_priority::client::{HttpTaskSync, TaskBoard};
use task_priority::config::Config;
use task_priority::task::{Task, TaskId};
use task_priority::util::parse_target_date;

#[derive(Parser)]
#[command(name = "taskprio")]
#[command(about = "Prioritize tasks: add, reorder, focus, complete", long_about = None)]
struct Cli {
    /// Base URL of the task-priority API (overrides TASK_PRIORITY_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active task list
    List,
    /// Add a task at the end of the list
    Add {
        description: String,
        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        target: Option<String>,
    },
    /// Drag a task onto another task's slot
    Move { active: String, over: String },
    /// Make a task the top priority
    Top { task: String },
    /// Clear the top-priority flag
    Untop { task: String },
    /// Mark a task complete and move it to history
    Done { task: String },
    /// Show completed tasks, most recent first
    History,
    /// Show the task currently being worked on
    Focus,
}

/// Find a task by id, or failing that by 1-based position.
fn resolve(tasks: &[Task], reference: &str) -> Result<TaskId> {
    if let Some(task) = tasks.iter().find(|t| t.id.as_str() == reference) {
        return Ok(task.id.clone());
    }
    reference
        .parse::<usize>()
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|i| tasks.get(i))
        .map(|t| t.id.clone())
        .with_context(|| format!("No task matches '{}'", reference))
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    for task in tasks {
        let marker = if task.is_top_priority { "*" } else { " " };
        let target = task
            .target_date
            .map(|d| format!("  (target {})", d.format("%Y-%m-%d")))
            .unwrap_or_default();
        println!(
            "{} {:>3}. {}{}  [{}]",
            marker,
            task.order + 1,
            task.description,
            target,
            task.id
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "task_priority=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let api_url = cli.api_url.unwrap_or(config.api_url);

    let board = TaskBoard::new(Arc::new(HttpTaskSync::new(api_url.clone())));
    board
        .load()
        .await
        .with_context(|| format!("Failed to load tasks from {}", api_url))?;

    match cli.command {
        Commands::List => print_tasks(&board.tasks().await),
        Commands::Add {
            description,
            target,
        } => {
            let target_date = match target {
                Some(raw) => match parse_target_date(&raw) {
                    Some(date) => Some(date),
                    None => bail!("Invalid target date '{}', expected YYYY-MM-DD", raw),
                },
                None => None,
            };
            let task = board
                .add_task(&description, target_date)
                .await?
                .settled()
                .await;
            println!("Added '{}' at position {}", task.description, task.order + 1);
        }
        Commands::Move { active, over } => {
            let tasks = board.tasks().await;
            let active = resolve(&tasks, &active)?;
            let over = resolve(&tasks, &over)?;
            board.reorder(&active, &over).await.settled().await;
            print_tasks(&board.tasks().await);
        }
        Commands::Top { task } => {
            let id = resolve(&board.tasks().await, &task)?;
            board.set_top_priority(&id).await?.settled().await;
            print_tasks(&board.tasks().await);
        }
        Commands::Untop { task } => {
            let id = resolve(&board.tasks().await, &task)?;
            board.unset_top_priority(&id).await?.settled().await;
            print_tasks(&board.tasks().await);
        }
        Commands::Done { task } => {
            let id = resolve(&board.tasks().await, &task)?;
            let completed = board.complete(&id).await?.settled().await;
            println!(
                "Completed '{}' at {}",
                completed.description,
                completed.completed_date.format("%Y-%m-%d %H:%M")
            );
        }
        Commands::History => {
            let history = board.history().await;
            if history.is_empty() {
                println!("No completed tasks.");
            }
            for entry in history {
                println!(
                    "{}  {}",
                    entry.completed_date.format("%Y-%m-%d"),
                    entry.description
                );
            }
        }
        Commands::Focus => match board.current_focus().await {
            Some(task) => println!("Currently working on: {}", task.description),
            None => println!("Nothing at the moment."),
        },
    }

    Ok(())
}
