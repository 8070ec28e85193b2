//! Reading simulation engine for the books catalog.
//!
//! ```text
//! command surface -> SimulationCoordinator -> (BookRepository, ReadingSimulator)
//!                            |
//!                            v
//!                    SimulationReport (input order)
//! ```
//!
//! The coordinator receives its repository and simulator at construction;
//! nothing here reaches for process-wide state. Per-identifier failures are
//! data in the report. The only error is a malformed request.

mod coordinator;
mod simulator;
mod surface;

pub use coordinator::{GRACE, SimulationCoordinator};
pub use simulator::{PacedReader, ReadingFut, ReadingPace, ReadingSimulator, ReadingSummary};
pub use surface::{ParsedTokens, parse_tokens};

pub use books_types::{
    DEFAULT_SIMULATION_BUDGET, InvalidRequest, SimulationOutcome, SimulationReport,
    SimulationRequest,
};

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    InvalidRequest(#[from] InvalidRequest),
}
