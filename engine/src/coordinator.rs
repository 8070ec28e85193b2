//! Simulation Coordinator - fan-out, deadline, and ordered reassembly.
//!
//! # Deadline policy
//!
//! One wall-clock deadline per request: `start + budget`, shared by every
//! task. A task that waits for a concurrency permit spends its own budget
//! waiting. The coordinator itself stops collecting at `deadline + GRACE`,
//! aborts whatever is still running, and records those slots as timed out.
//!
//! # Result slots
//!
//! Each task carries its input position and returns `(index, outcome)`.
//! The coordinator is the only writer of the slot vector, and each slot is
//! written at most once. Slots are read back in input order, so completion
//! order never leaks into the report.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

use books_types::{
    BookId, BookRepository, LookupError, SimulationOutcome, SimulationReport, SimulationRequest,
};

use crate::SimulationError;
use crate::simulator::{ReadingSimulator, ReadingSummary};

/// How long past the deadline the coordinator keeps collecting before aborting stragglers.
pub const GRACE: Duration = Duration::from_millis(50);

/// Stand-in deadline for budgets too large to add to the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn deadline_after(start: Instant, budget: Duration) -> Instant {
    start
        .checked_add(budget)
        .unwrap_or_else(|| start + FAR_FUTURE)
}

pub struct SimulationCoordinator {
    repository: Arc<dyn BookRepository>,
    simulator: Arc<dyn ReadingSimulator>,
    permits: Option<Arc<Semaphore>>,
    max_concurrency: Option<usize>,
}

impl SimulationCoordinator {
    pub fn new(repository: Arc<dyn BookRepository>, simulator: Arc<dyn ReadingSimulator>) -> Self {
        Self {
            repository,
            simulator,
            permits: None,
            max_concurrency: None,
        }
    }

    /// Cap the number of identifiers in flight. `0` leaves fan-out unbounded.
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = (limit > 0).then_some(limit);
        self.permits = self.max_concurrency.map(|n| Arc::new(Semaphore::new(n)));
        self
    }

    #[must_use]
    pub fn max_concurrency(&self) -> Option<usize> {
        self.max_concurrency
    }

    /// Validate and run. Fails only when the request itself is malformed.
    pub async fn simulate(
        &self,
        identifiers: Vec<BookId>,
        budget: Duration,
    ) -> Result<SimulationReport, SimulationError> {
        let request = SimulationRequest::new(identifiers, budget)?;
        Ok(self.run(&request).await)
    }

    /// Run a validated request. Always returns one outcome per identifier.
    pub async fn run(&self, request: &SimulationRequest) -> SimulationReport {
        let budget = request.budget();
        let started = Instant::now();
        let deadline = deadline_after(started, budget);

        tracing::info!(
            tasks = request.len(),
            budget_ms = budget.as_millis() as u64,
            bounded = self.permits.is_some(),
            "Starting reading simulation"
        );

        let mut tasks = JoinSet::new();
        let mut positions = HashMap::with_capacity(request.len());
        for (index, &identifier) in request.identifiers().iter().enumerate() {
            let task = ReadingTask {
                index,
                identifier,
                budget,
                deadline,
                repository: Arc::clone(&self.repository),
                simulator: Arc::clone(&self.simulator),
                permits: self.permits.clone(),
            };
            let handle = tasks.spawn(task.run());
            positions.insert(handle.id(), index);
        }

        let mut slots: Vec<Option<SimulationOutcome>> = vec![None; request.len()];
        let hard_stop = deadline.checked_add(GRACE).unwrap_or(deadline);
        loop {
            match tokio::time::timeout_at(hard_stop, tasks.join_next_with_id()).await {
                Ok(Some(Ok((_, (index, outcome))))) => record(&mut slots, index, outcome),
                Ok(Some(Err(err))) => {
                    tracing::error!("Reading task did not finish: {err}");
                    if let Some(&index) = positions.get(&err.id()) {
                        let identifier = request.identifiers()[index];
                        let reason = format!("reading task aborted: {err}");
                        record(&mut slots, index, SimulationOutcome::Failed { identifier, reason });
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        pending = tasks.len(),
                        "Abandoning reading tasks past the deadline"
                    );
                    tasks.abort_all();
                    break;
                }
            }
        }

        let outcomes: Vec<SimulationOutcome> = slots
            .into_iter()
            .zip(request.identifiers())
            .map(|(slot, &identifier)| {
                slot.unwrap_or(SimulationOutcome::TimedOut { identifier, budget })
            })
            .collect();
        let report = SimulationReport::new(outcomes);

        let counts = report.counts();
        tracing::info!(
            completed = counts.completed,
            not_found = counts.not_found,
            timed_out = counts.timed_out,
            failed = counts.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Reading simulation finished"
        );
        report
    }
}

fn record(slots: &mut [Option<SimulationOutcome>], index: usize, outcome: SimulationOutcome) {
    match slots.get_mut(index) {
        Some(slot) if slot.is_none() => *slot = Some(outcome),
        Some(_) => tracing::error!(index, "Result slot written twice; keeping the first outcome"),
        None => tracing::error!(index, "Result slot index out of range"),
    }
}

struct ReadingTask {
    index: usize,
    identifier: BookId,
    budget: Duration,
    deadline: Instant,
    repository: Arc<dyn BookRepository>,
    simulator: Arc<dyn ReadingSimulator>,
    permits: Option<Arc<Semaphore>>,
}

impl ReadingTask {
    async fn run(self) -> (usize, SimulationOutcome) {
        let index = self.index;
        let identifier = self.identifier;
        let budget = self.budget;
        let deadline = self.deadline;

        let work = AssertUnwindSafe(self.attempt()).catch_unwind();
        let outcome = match tokio::time::timeout_at(deadline, work).await {
            Err(_) => {
                tracing::debug!(%identifier, index, "Reading timed out");
                SimulationOutcome::TimedOut { identifier, budget }
            }
            Ok(Err(payload)) => {
                let reason = format!("task panicked: {}", panic_payload_to_string(&payload));
                tracing::warn!(%identifier, index, "{reason}");
                SimulationOutcome::Failed { identifier, reason }
            }
            Ok(Ok(outcome)) => outcome,
        };
        (index, outcome)
    }

    async fn attempt(self) -> SimulationOutcome {
        let identifier = self.identifier;

        let _permit = match &self.permits {
            Some(permits) => match Arc::clone(permits).acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(_) => {
                    return SimulationOutcome::Failed {
                        identifier,
                        reason: "concurrency limiter closed".to_string(),
                    };
                }
            },
            None => None,
        };

        // Lookups are synchronous; keep them off the async workers.
        let repository = Arc::clone(&self.repository);
        let lookup = tokio::task::spawn_blocking(move || repository.lookup(identifier)).await;
        let book = match lookup {
            Ok(Ok(book)) => book,
            Ok(Err(LookupError::NotFound(_))) => {
                tracing::debug!(%identifier, "Book not found");
                return SimulationOutcome::NotFound { identifier };
            }
            Ok(Err(LookupError::Backend(reason))) => {
                tracing::warn!(%identifier, "Lookup failed: {reason}");
                return SimulationOutcome::Failed { identifier, reason };
            }
            Err(err) => {
                return SimulationOutcome::Failed {
                    identifier,
                    reason: format!("lookup task failed: {err}"),
                };
            }
        };

        let started = Instant::now();
        let ReadingSummary { summary } = self.simulator.read(&book).await;
        let elapsed = started.elapsed();
        tracing::debug!(%identifier, elapsed_ms = elapsed.as_millis() as u64, "Reading completed");
        SimulationOutcome::Completed {
            identifier,
            elapsed,
            summary,
        }
    }
}

fn panic_payload_to_string(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
