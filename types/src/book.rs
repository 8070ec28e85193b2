use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::{BookId, NonEmptyString};

/// Snapshot of a catalog entry as the repository returned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub genre: String,
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Title: {}, Author: {}, Genre: {}",
            self.id, self.title, self.author, self.genre
        )
    }
}

/// Field values for a book that has not been stored yet (or is being replaced).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    pub title: NonEmptyString,
    pub author: NonEmptyString,
    pub genre: NonEmptyString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("book {field} must not be empty")]
pub struct BookDraftError {
    pub field: &'static str,
}

impl BookDraft {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
    ) -> Result<Self, BookDraftError> {
        let field = |name: &'static str, value: String| {
            NonEmptyString::new(value.trim()).map_err(|_| BookDraftError { field: name })
        };
        Ok(Self {
            title: field("title", title.into())?,
            author: field("author", author.into())?,
            genre: field("genre", genre.into())?,
        })
    }

    #[must_use]
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title.into_inner(),
            author: self.author.into_inner(),
            genre: self.genre.into_inner(),
        }
    }
}
