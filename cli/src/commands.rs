use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use books_config::BooksConfig;
use books_engine::{
    PacedReader, ReadingPace, SimulationCoordinator, SimulationOutcome, SimulationReport,
    parse_tokens,
};
use books_store::BookStore;
use books_types::{BookDraft, BookId, budget_from_millis};

pub(crate) fn list(store: &BookStore, json: bool) -> Result<()> {
    let books = store.list()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&books)?);
    } else if books.is_empty() {
        println!("No books in the catalog");
    } else {
        for book in &books {
            println!("{book}");
        }
    }
    Ok(())
}

pub(crate) fn get(store: &BookStore, id: BookId, json: bool) -> Result<()> {
    let Some(book) = store.get(id)? else {
        bail!("Book {id} not found");
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&book)?);
    } else {
        println!("{book}");
    }
    Ok(())
}

pub(crate) fn add(store: &BookStore, title: &str, author: &str, genre: &str) -> Result<()> {
    let draft = BookDraft::new(title, author, genre)?;
    let book = store.create(&draft)?;
    println!("{book}");
    Ok(())
}

pub(crate) fn update(
    store: &BookStore,
    id: BookId,
    title: &str,
    author: &str,
    genre: &str,
) -> Result<()> {
    let draft = BookDraft::new(title, author, genre)?;
    let Some(book) = store.update(id, &draft)? else {
        bail!("Book {id} not found");
    };
    println!("{book}");
    Ok(())
}

pub(crate) fn delete(store: &BookStore, id: BookId) -> Result<()> {
    if !store.delete(id)? {
        bail!("Book {id} not found");
    }
    println!("Deleted book {id}");
    Ok(())
}

pub(crate) fn search(store: &BookStore, title: &str) -> Result<()> {
    for book in store.search_by_title(title)? {
        println!("{book}");
    }
    Ok(())
}

#[derive(Serialize)]
struct SimulationOutput<'a> {
    rejected: &'a [SimulationOutcome],
    outcomes: &'a SimulationReport,
}

pub(crate) async fn simulate(
    store: BookStore,
    config: &BooksConfig,
    tokens: &[String],
    budget_ms: Option<i64>,
    json: bool,
) -> Result<()> {
    let budget = match budget_ms {
        Some(ms) => budget_from_millis(ms)?,
        None => config.simulation_budget()?,
    };

    let parsed = parse_tokens(tokens);
    for rejected in &parsed.rejected {
        eprintln!("{rejected}");
    }

    let pace = config.pace();
    let reader = PacedReader::new(ReadingPace::new(pace.base, pace.per_title_char));
    let mut coordinator = SimulationCoordinator::new(Arc::new(store), Arc::new(reader));
    if let Some(limit) = config.max_concurrency() {
        coordinator = coordinator.with_max_concurrency(limit);
    }

    let report = coordinator
        .simulate(parsed.identifiers, budget)
        .await
        .context("Reading simulation rejected")?;

    if json {
        let output = SimulationOutput {
            rejected: &parsed.rejected,
            outcomes: &report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{report}");
    }
    Ok(())
}
