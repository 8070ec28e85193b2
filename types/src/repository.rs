use thiserror::Error;

use crate::{Book, BookId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("book {0} not found")]
    NotFound(BookId),
    #[error("repository error: {0}")]
    Backend(String),
}

/// Read access to the catalog. Implementations must tolerate concurrent lookups.
pub trait BookRepository: Send + Sync {
    fn lookup(&self, id: BookId) -> Result<Book, LookupError>;
}
