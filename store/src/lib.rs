//! SQLite-backed storage for the books catalog.

mod book_store;
mod sqlite_util;

pub use book_store::BookStore;
