//! Book Store - SQLite persistence for the catalog.
//!
//! One `books` table, one row per catalog entry. The connection sits behind a
//! mutex so a single store can serve concurrent lookups from the simulator's
//! blocking tasks.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use books_types::{Book, BookDraft, BookId, BookRepository, LookupError};

use crate::sqlite_util::{escape_like, open_private_db};

pub struct BookStore {
    db: Mutex<Connection>,
}

impl BookStore {
    const SCHEMA: &'static str = r"
        CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            genre TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_books_title
        ON books(title);
    ";

    /// Open or create the catalog database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = open_private_db(path)?;
        tracing::debug!(path = %path.display(), "Opened book store");
        Self::initialize(db)
    }

    /// Open an in-memory catalog (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory book store")?;
        Self::initialize(db)
    }

    fn initialize(db: Connection) -> Result<Self> {
        db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")
            .context("Failed to set book store pragmas")?;
        db.execute_batch(Self::SCHEMA)
            .context("Failed to create book store schema")?;
        Ok(Self { db: Mutex::new(db) })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|_| anyhow!("Book store connection lock poisoned"))
    }

    pub fn create(&self, draft: &BookDraft) -> Result<Book> {
        let db = self.conn()?;
        db.execute(
            "INSERT INTO books (title, author, genre) VALUES (?1, ?2, ?3)",
            params![draft.title.as_str(), draft.author.as_str(), draft.genre.as_str()],
        )
        .context("Failed to insert book")?;

        let id = BookId::new(db.last_insert_rowid()).context("SQLite returned a non-positive rowid")?;
        tracing::info!(%id, title = draft.title.as_str(), "Created book");
        Ok(draft.clone().into_book(id))
    }

    pub fn get(&self, id: BookId) -> Result<Option<Book>> {
        self.conn()?
            .query_row(
                "SELECT id, title, author, genre FROM books WHERE id = ?1",
                [id.value()],
                book_from_row,
            )
            .optional()
            .with_context(|| format!("Failed to load book {id}"))
    }

    pub fn list(&self) -> Result<Vec<Book>> {
        let db = self.conn()?;
        let mut stmt = db
            .prepare("SELECT id, title, author, genre FROM books ORDER BY id ASC")
            .context("Failed to prepare list query")?;
        let rows = stmt
            .query_map([], book_from_row)
            .context("Failed to query books")?;

        let mut books = Vec::new();
        for row in rows {
            books.push(row.context("Failed to read book row")?);
        }
        Ok(books)
    }

    /// Replace every field of an existing book. `None` if the id is unknown.
    pub fn update(&self, id: BookId, draft: &BookDraft) -> Result<Option<Book>> {
        let changed = self
            .conn()?
            .execute(
                "UPDATE books SET title = ?1, author = ?2, genre = ?3 WHERE id = ?4",
                params![
                    draft.title.as_str(),
                    draft.author.as_str(),
                    draft.genre.as_str(),
                    id.value()
                ],
            )
            .with_context(|| format!("Failed to update book {id}"))?;

        if changed == 0 {
            return Ok(None);
        }
        tracing::info!(%id, "Updated book");
        Ok(Some(draft.clone().into_book(id)))
    }

    /// Returns whether a row was removed.
    pub fn delete(&self, id: BookId) -> Result<bool> {
        let changed = self
            .conn()?
            .execute("DELETE FROM books WHERE id = ?1", [id.value()])
            .with_context(|| format!("Failed to delete book {id}"))?;
        if changed > 0 {
            tracing::info!(%id, "Deleted book");
        }
        Ok(changed > 0)
    }

    /// Case-insensitive substring match on the title.
    pub fn search_by_title(&self, query: &str) -> Result<Vec<Book>> {
        let pattern = format!("%{}%", escape_like(query));
        let db = self.conn()?;
        let mut stmt = db
            .prepare(
                "SELECT id, title, author, genre
                 FROM books
                 WHERE title LIKE ?1 ESCAPE '\\'
                 ORDER BY id ASC",
            )
            .context("Failed to prepare search query")?;
        let rows = stmt
            .query_map([&pattern], book_from_row)
            .context("Failed to execute search query")?;

        let mut books = Vec::new();
        for row in rows {
            books.push(row.context("Failed to read search result")?);
        }
        Ok(books)
    }
}

impl BookRepository for BookStore {
    fn lookup(&self, id: BookId) -> Result<Book, LookupError> {
        match self.get(id) {
            Ok(Some(book)) => Ok(book),
            Ok(None) => Err(LookupError::NotFound(id)),
            Err(err) => {
                tracing::warn!(%id, "Book lookup failed: {err:#}");
                Err(LookupError::Backend(format!("{err:#}")))
            }
        }
    }
}

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    let raw_id: i64 = row.get(0)?;
    let id = BookId::new(raw_id)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(err)))?;
    Ok(Book {
        id,
        title: row.get(1)?,
        author: row.get(2)?,
        genre: row.get(3)?,
    })
}
