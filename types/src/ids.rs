use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Catalog key for a book. Always positive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct BookId(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid book ID: {raw}")]
pub struct InvalidBookId {
    raw: String,
}

impl InvalidBookId {
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl BookId {
    pub fn new(id: i64) -> Result<Self, InvalidBookId> {
        if id > 0 {
            Ok(Self(id))
        } else {
            Err(InvalidBookId {
                raw: id.to_string(),
            })
        }
    }

    #[must_use]
    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookId {
    type Err = InvalidBookId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidBookId { raw: s.to_string() };
        let id: i64 = s.trim().parse().map_err(|_| invalid())?;
        if id > 0 { Ok(Self(id)) } else { Err(invalid()) }
    }
}

impl TryFrom<i64> for BookId {
    type Error = InvalidBookId;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BookId> for i64 {
    fn from(value: BookId) -> Self {
        value.0
    }
}
