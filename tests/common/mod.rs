//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

use books_store::BookStore;
use books_types::BookDraft;
use tempfile::TempDir;

pub const CATALOG: &[(&str, &str, &str)] = &[
    ("Dune", "Frank Herbert", "Sci-Fi"),
    ("Emma", "Jane Austen", "Romance"),
    ("Ulysses", "James Joyce", "Modernist"),
];

/// In-memory store holding `CATALOG` as ids 1..=3.
pub fn seeded_store() -> BookStore {
    let store = BookStore::open_in_memory().expect("in-memory store");
    for &(title, author, genre) in CATALOG {
        let draft = BookDraft::new(title, author, genre).expect("valid draft");
        store.create(&draft).expect("insert");
    }
    store
}

/// Scratch directory acting as `$HOME` for the `books` binary.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    /// Fast reading pace so simulations finish well inside small budgets.
    pub fn new() -> Self {
        Self::with_config(
            r"
            [simulation]
            budget_ms = 2000
            base_ms = 20
            per_title_char_ms = 0
            ",
        )
    }

    pub fn with_config(config: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("config.toml"), config).expect("write config");
        Self { dir }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("data").join("books.db")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn books(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_books"))
            .arg("--database")
            .arg(self.db_path())
            .arg("--config")
            .arg(self.config_path())
            .args(args)
            .env("HOME", self.dir.path())
            .env_remove("RUST_LOG")
            .env_remove("BOOKS_CONFIG")
            .output()
            .expect("run books binary")
    }

    /// Insert `CATALOG` through the CLI.
    pub fn seed(&self) {
        for &(title, author, genre) in CATALOG {
            let out = self.books(&[
                "add", "--title", title, "--author", author, "--genre", genre,
            ]);
            assert!(out.status.success(), "add failed: {}", stderr(&out));
        }
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
