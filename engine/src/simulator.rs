//! Reading Simulator - the unit of concurrent work.
//!
//! A simulator suspends for as long as "reading" a book takes and then
//! summarises it. It owns no deadline: the coordinator races it against one
//! and drops the future when the deadline wins.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use books_types::Book;

pub type ReadingFut<'a> = Pin<Box<dyn Future<Output = ReadingSummary> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingSummary {
    pub summary: String,
}

pub trait ReadingSimulator: Send + Sync {
    fn read<'a>(&'a self, book: &'a Book) -> ReadingFut<'a>;
}

/// Reading time model: a fixed base plus a per-character cost on the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingPace {
    pub base: Duration,
    pub per_title_char: Duration,
}

impl ReadingPace {
    #[must_use]
    pub const fn new(base: Duration, per_title_char: Duration) -> Self {
        Self {
            base,
            per_title_char,
        }
    }

    /// Same duration for every book.
    #[must_use]
    pub const fn fixed(duration: Duration) -> Self {
        Self::new(duration, Duration::ZERO)
    }

    #[must_use]
    pub fn duration_for(&self, book: &Book) -> Duration {
        let chars = u32::try_from(book.title.chars().count()).unwrap_or(u32::MAX);
        self.base
            .saturating_add(self.per_title_char.saturating_mul(chars))
    }
}

/// Default simulator: sleeps for the paced duration on the tokio timer.
#[derive(Debug, Clone)]
pub struct PacedReader {
    pace: ReadingPace,
}

impl PacedReader {
    #[must_use]
    pub fn new(pace: ReadingPace) -> Self {
        Self { pace }
    }
}

impl ReadingSimulator for PacedReader {
    fn read<'a>(&'a self, book: &'a Book) -> ReadingFut<'a> {
        Box::pin(async move {
            let duration = self.pace.duration_for(book);
            tracing::trace!(id = %book.id, duration_ms = duration.as_millis() as u64, "Reading");
            tokio::time::sleep(duration).await;
            ReadingSummary {
                summary: format!("Read \"{}\" by {}", book.title, book.author),
            }
        })
    }
}
