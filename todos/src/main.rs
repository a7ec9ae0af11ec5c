//! Command-line front end for the persisted todo list.
//!
//! Usage:
//!
//! ```bash
//! starter-todos add "Buy milk"
//! starter-todos list --active
//! starter-todos toggle <ID>
//! starter-todos stats
//! ```

use clap::{Parser, Subcommand};
use starter_todos::{JsonFileStorage, Todo, TodoFilter, TodoList, DEFAULT_STORAGE_KEY};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Manage a todo list stored on disk
#[derive(Parser, Debug)]
#[command(name = "starter-todos")]
#[command(about = "Manage a todo list stored on disk")]
#[command(version)]
struct Args {
    /// Directory holding the todo file
    #[arg(long, env = "STARTER_DATA_DIR", default_value = ".starter", global = true)]
    data_dir: PathBuf,

    /// Storage key; the list lives in `<data-dir>/<key>.json`
    #[arg(long, default_value = DEFAULT_STORAGE_KEY, global = true)]
    key: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show todos
    List {
        /// Only completed todos
        #[arg(long, conflicts_with = "active")]
        completed: bool,

        /// Only open todos
        #[arg(long)]
        active: bool,
    },

    /// Add a todo
    Add {
        /// What needs doing
        text: String,
    },

    /// Flip a todo between open and completed
    Toggle {
        /// Todo id
        id: String,
    },

    /// Delete a todo
    Delete {
        /// Todo id
        id: String,
    },

    /// Delete every completed todo
    ClearCompleted,

    /// Mark every todo completed
    MarkAll {
        /// Mark every todo open instead
        #[arg(long)]
        incomplete: bool,
    },

    /// Show completed, active and total counts
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let storage = JsonFileStorage::new(&args.data_dir, args.key)?;
    tracing::debug!(path = %storage.path().display(), "Using todo storage");

    let list = TodoList::persisted(storage);
    run(&list, args.command).await?;

    list.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}

async fn run(list: &TodoList, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List { completed, active } => {
            let filter = if completed {
                TodoFilter::Completed
            } else if active {
                TodoFilter::Active
            } else {
                TodoFilter::All
            };
            let todos = list.filtered(filter).await;
            if todos.is_empty() {
                println!("No todos");
            }
            for todo in &todos {
                print_todo(todo);
            }
        },
        Command::Add { text } => {
            let before = list.revision().await;
            list.add(text).await?;
            if list.revision().await == before {
                anyhow::bail!("todo text must not be blank");
            }
            if let Some(todo) = list.todos().await.last() {
                print_todo(todo);
            }
        },
        Command::Toggle { id } => {
            list.toggle(id.as_str()).await?;
            match list.get(&id).await {
                Some(todo) => print_todo(&todo),
                None => anyhow::bail!("no todo with id {id}"),
            }
        },
        Command::Delete { id } => {
            let Some(todo) = list.get(&id).await else {
                anyhow::bail!("no todo with id {id}");
            };
            list.delete(id).await?;
            println!("Deleted: {}", todo.text);
        },
        Command::ClearCompleted => {
            let removed = list.stats().await.completed;
            list.clear_completed().await?;
            println!("Removed {removed} completed todo(s)");
        },
        Command::MarkAll { incomplete } => {
            list.mark_all_completed(!incomplete).await?;
            let state = if incomplete { "open" } else { "completed" };
            println!("Marked {} todo(s) {state}", list.stats().await.total);
        },
        Command::Stats => {
            let stats = list.stats().await;
            println!(
                "total: {}  completed: {}  active: {}",
                stats.total, stats.completed, stats.active
            );
        },
    }
    Ok(())
}

fn print_todo(todo: &Todo) {
    let mark = if todo.completed { "x" } else { " " };
    println!("[{mark}] {}  {}", todo.id, todo.text);
}
