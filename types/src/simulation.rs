//! Request, per-identifier outcome, and report types for simulated reading runs.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::BookId;

/// Budget used when neither configuration nor the caller supplies one.
pub const DEFAULT_SIMULATION_BUDGET: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid simulation request: {reason}")]
pub struct InvalidRequest {
    reason: String,
}

impl InvalidRequest {
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Convert a signed millisecond count into a budget. Zero and negative values are rejected.
pub fn budget_from_millis(millis: i64) -> Result<Duration, InvalidRequest> {
    match u64::try_from(millis) {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(InvalidRequest {
            reason: format!("budget must be positive, got {millis}ms"),
        }),
    }
}

/// One simulation run: identifiers in caller order (duplicates kept) and a shared budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationRequest {
    identifiers: Vec<BookId>,
    budget: Duration,
}

impl SimulationRequest {
    pub fn new(identifiers: Vec<BookId>, budget: Duration) -> Result<Self, InvalidRequest> {
        if budget.is_zero() {
            return Err(InvalidRequest {
                reason: "budget must be positive, got 0ms".to_string(),
            });
        }
        Ok(Self {
            identifiers,
            budget,
        })
    }

    #[must_use]
    pub fn identifiers(&self) -> &[BookId] {
        &self.identifiers
    }

    #[must_use]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

/// Result of simulating one requested identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SimulationOutcome {
    Completed {
        identifier: BookId,
        elapsed: Duration,
        summary: String,
    },
    NotFound {
        identifier: BookId,
    },
    TimedOut {
        identifier: BookId,
        budget: Duration,
    },
    /// A token that never became an identifier. Produced before dispatch.
    InvalidInput {
        raw_value: String,
    },
    /// Repository backend error or a panic inside the task.
    Failed {
        identifier: BookId,
        reason: String,
    },
}

impl SimulationOutcome {
    #[must_use]
    pub fn identifier(&self) -> Option<BookId> {
        match self {
            Self::Completed { identifier, .. }
            | Self::NotFound { identifier }
            | Self::TimedOut { identifier, .. }
            | Self::Failed { identifier, .. } => Some(*identifier),
            Self::InvalidInput { .. } => None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "completed",
            Self::NotFound { .. } => "not_found",
            Self::TimedOut { .. } => "timed_out",
            Self::InvalidInput { .. } => "invalid_input",
            Self::Failed { .. } => "failed",
        }
    }

    /// Equality that ignores timing: same variant, same identifier (or raw token).
    #[must_use]
    pub fn same_variant(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidInput { raw_value: a }, Self::InvalidInput { raw_value: b }) => a == b,
            _ => self.kind() == other.kind() && self.identifier() == other.identifier(),
        }
    }
}

impl fmt::Display for SimulationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed {
                identifier,
                elapsed,
                summary,
            } => write!(
                f,
                "Book {identifier}: completed in {:.2}s - {summary}",
                elapsed.as_secs_f64()
            ),
            Self::NotFound { identifier } => write!(f, "Book {identifier}: not found"),
            Self::TimedOut { identifier, budget } => write!(
                f,
                "Book {identifier}: timed out after {:.2}s",
                budget.as_secs_f64()
            ),
            Self::InvalidInput { raw_value } => write!(f, "Invalid book ID: {raw_value}"),
            Self::Failed { identifier, reason } => {
                write!(f, "Book {identifier}: failed - {reason}")
            }
        }
    }
}

/// Tally of outcomes per variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub completed: usize,
    pub not_found: usize,
    pub timed_out: usize,
    pub invalid_input: usize,
    pub failed: usize,
}

/// Outcomes in request order: `outcomes()[i]` belongs to `identifiers()[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SimulationReport {
    outcomes: Vec<SimulationOutcome>,
}

impl SimulationReport {
    #[must_use]
    pub fn new(outcomes: Vec<SimulationOutcome>) -> Self {
        Self { outcomes }
    }

    #[must_use]
    pub fn outcomes(&self) -> &[SimulationOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SimulationOutcome> {
        self.outcomes.iter()
    }

    #[must_use]
    pub fn counts(&self) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        for outcome in &self.outcomes {
            match outcome {
                SimulationOutcome::Completed { .. } => counts.completed += 1,
                SimulationOutcome::NotFound { .. } => counts.not_found += 1,
                SimulationOutcome::TimedOut { .. } => counts.timed_out += 1,
                SimulationOutcome::InvalidInput { .. } => counts.invalid_input += 1,
                SimulationOutcome::Failed { .. } => counts.failed += 1,
            }
        }
        counts
    }

    /// Compare two reports ignoring `elapsed` and summaries.
    #[must_use]
    pub fn same_variants(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .outcomes
                .iter()
                .zip(&other.outcomes)
                .all(|(a, b)| a.same_variant(b))
    }
}

impl<'a> IntoIterator for &'a SimulationReport {
    type Item = &'a SimulationOutcome;
    type IntoIter = std::slice::Iter<'a, SimulationOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(f, "{outcome}")?;
        }
        Ok(())
    }
}
