//! Books CLI - catalog management and concurrent reading simulation.
//!
//! ```text
//! main() -> BooksConfig::load -> init_tracing -> BookStore::open -> command
//!                                                                   |
//!                            simulate: parse_tokens -> SimulationCoordinator
//! ```
//!
//! Command output goes to stdout, warnings to stderr, and logs to
//! `~/.books/logs/books.log` so the two streams stay clean.
//!
//! The runtime is built by hand so shutdown waits at most [`GRACE`] for
//! lookups still blocked past the simulation deadline.

mod commands;

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use books_config::{BooksConfig, books_home};
use books_engine::GRACE;
use books_store::BookStore;
use books_types::BookId;

#[derive(Parser)]
#[command(name = "books")]
#[command(about = "Catalog of books with concurrent reading simulation")]
struct Cli {
    /// SQLite catalog file (overrides the configured path)
    #[arg(long, global = true)]
    database: Option<PathBuf>,
    /// Config file (overrides $BOOKS_CONFIG and ~/.books/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every book
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one book
    Get {
        id: BookId,
        #[arg(long)]
        json: bool,
    },
    /// Add a book
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        genre: String,
    },
    /// Replace a book's fields
    Update {
        id: BookId,
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        genre: String,
    },
    /// Delete a book
    Delete { id: BookId },
    /// Find books whose title contains the given text
    Search { title: String },
    /// Simulate reading several books concurrently under one time budget
    Simulate {
        /// Book IDs; invalid tokens are reported and skipped
        #[arg(required = true, allow_negative_numbers = true)]
        ids: Vec<String>,
        /// Time budget in milliseconds (defaults to config, then 5000)
        #[arg(long, allow_negative_numbers = true)]
        budget_ms: Option<i64>,
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(config_filter: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config_filter.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match open_log_file() {
        Some(file) => tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init(),
        // Without a log file, stay silent rather than mixing logs into command output.
        None => tracing_subscriber::registry().with(env_filter).init(),
    }
}

/// `~/.books/logs/books.log`, else `./.books/logs/books.log`.
fn open_log_file() -> Option<fs::File> {
    books_home()
        .into_iter()
        .chain([PathBuf::from(".books")])
        .map(|home| home.join("logs"))
        .find_map(|dir| {
            fs::create_dir_all(&dir).ok()?;
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("books.log"))
                .ok()
        })
}

fn load_config(explicit: Option<&PathBuf>) -> Result<BooksConfig> {
    let loaded = match explicit {
        Some(path) => BooksConfig::load_from(path)?,
        None => BooksConfig::load()?,
    };
    Ok(loaded.unwrap_or_default())
}

fn block_on_bounded<F: Future>(work: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    let output = runtime.block_on(work);
    runtime.shutdown_timeout(GRACE);
    Ok(output)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;
    init_tracing(config.log_filter());

    block_on_bounded(run(cli, config))?
}

async fn run(cli: Cli, config: BooksConfig) -> Result<()> {
    let db_path = cli
        .database
        .clone()
        .or_else(|| config.database_path())
        .context("Could not determine the catalog database path; pass --database")?;
    let store = BookStore::open(&db_path)?;

    match cli.command {
        Commands::List { json } => commands::list(&store, json),
        Commands::Get { id, json } => commands::get(&store, id, json),
        Commands::Add {
            title,
            author,
            genre,
        } => commands::add(&store, &title, &author, &genre),
        Commands::Update {
            id,
            title,
            author,
            genre,
        } => commands::update(&store, id, &title, &author, &genre),
        Commands::Delete { id } => commands::delete(&store, id),
        Commands::Search { title } => commands::search(&store, &title),
        Commands::Simulate {
            ids,
            budget_ms,
            json,
        } => commands::simulate(store, &config, &ids, budget_ms, json).await,
    }
}
