//! Coordinator running against the real SQLite store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use books_engine::{PacedReader, ReadingPace, SimulationCoordinator, SimulationOutcome};
use books_types::BookId;

use crate::common::seeded_store;

fn ids(values: &[i64]) -> Vec<BookId> {
    values.iter().map(|&v| BookId::new(v).unwrap()).collect()
}

fn coordinator(pace: ReadingPace) -> SimulationCoordinator {
    SimulationCoordinator::new(Arc::new(seeded_store()), Arc::new(PacedReader::new(pace)))
}

#[tokio::test]
async fn present_and_absent_books_in_request_order() {
    let coord = coordinator(ReadingPace::fixed(Duration::from_millis(20)));

    let report = coord
        .simulate(ids(&[1, 2, 999]), Duration::from_secs(5))
        .await
        .unwrap();

    let outcomes = report.outcomes();
    assert_eq!(outcomes.len(), 3);
    assert!(matches!(
        &outcomes[0],
        SimulationOutcome::Completed { identifier, summary, .. }
            if identifier.value() == 1 && summary == "Read \"Dune\" by Frank Herbert"
    ));
    assert!(matches!(
        &outcomes[1],
        SimulationOutcome::Completed { identifier, .. } if identifier.value() == 2
    ));
    assert_eq!(
        outcomes[2],
        SimulationOutcome::NotFound {
            identifier: BookId::new(999).unwrap()
        }
    );
}

#[tokio::test]
async fn longer_titles_read_longer_and_can_time_out() {
    // "Emma" takes 4 * 60ms = 240ms, "Ulysses" 7 * 60ms = 420ms.
    let coord = coordinator(ReadingPace::new(Duration::ZERO, Duration::from_millis(60)));

    let started = Instant::now();
    let report = coord
        .simulate(ids(&[3, 2]), Duration::from_millis(330))
        .await
        .unwrap();

    let kinds: Vec<&str> = report.iter().map(SimulationOutcome::kind).collect();
    assert_eq!(kinds, vec!["timed_out", "completed"]);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn repeated_runs_are_stable() {
    let coord = coordinator(ReadingPace::fixed(Duration::from_millis(10)));
    let first = coord
        .simulate(ids(&[3, 42, 1]), Duration::from_secs(2))
        .await
        .unwrap();
    let second = coord
        .simulate(ids(&[3, 42, 1]), Duration::from_secs(2))
        .await
        .unwrap();
    assert!(first.same_variants(&second));
}
