//! Owner-only SQLite files for the catalog store.

use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Open the catalog at `path`. Missing parent directories are created 0o700
/// and a missing database file 0o600 on Unix; SQLite gives the `-wal` and
/// `-shm` files the database file's mode.
pub(crate) fn open_private_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_private_dir(parent)?;
    }

    if !path.exists() {
        let mut options = OpenOptions::new();
        options.create(true).truncate(false).write(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        options
            .open(path)
            .with_context(|| format!("Failed to create database file: {}", path.display()))?;
    }

    Connection::open(path).with_context(|| format!("Failed to open database at {}", path.display()))
}

fn create_private_dir(path: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
        .create(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
