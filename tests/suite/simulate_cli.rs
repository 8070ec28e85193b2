//! `books simulate` end to end.

use std::time::{Duration, Instant};

use crate::common::{Sandbox, stderr, stdout};

#[test]
fn reports_one_line_per_dispatched_id_in_order() {
    let sandbox = Sandbox::new();
    sandbox.seed();

    let out = sandbox.books(&["simulate", "2", "abc", "1", "999"]);
    assert!(out.status.success(), "{}", stderr(&out));

    let text = stdout(&out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3, "{text}");
    assert!(lines[0].starts_with("Book 2: completed in "), "{}", lines[0]);
    assert!(lines[0].ends_with("Read \"Emma\" by Jane Austen"), "{}", lines[0]);
    assert!(lines[1].starts_with("Book 1: completed in "), "{}", lines[1]);
    assert_eq!(lines[2], "Book 999: not found");

    assert!(stderr(&out).contains("Invalid book ID: abc"));
}

#[test]
fn negative_tokens_are_warned_not_dispatched() {
    let sandbox = Sandbox::new();
    sandbox.seed();

    let out = sandbox.books(&["simulate", "-4", "3"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stderr(&out).contains("Invalid book ID: -4"));
    assert_eq!(stdout(&out).lines().count(), 1);
}

#[test]
fn only_invalid_tokens_prints_warnings_and_succeeds() {
    let sandbox = Sandbox::new();
    let out = sandbox.books(&["simulate", "x", "y"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).is_empty());
    assert!(stderr(&out).contains("Invalid book ID: x"));
    assert!(stderr(&out).contains("Invalid book ID: y"));
}

#[test]
fn slow_reading_times_out_at_budget() {
    let sandbox = Sandbox::with_config(
        r"
        [simulation]
        base_ms = 10000
        ",
    );
    sandbox.seed();

    let started = Instant::now();
    let out = sandbox.books(&["simulate", "--budget-ms", "300", "1"]);
    let elapsed = started.elapsed();

    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "Book 1: timed out after 0.30s\n");
    assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
}

#[test]
fn non_positive_budget_is_rejected() {
    let sandbox = Sandbox::new();
    sandbox.seed();

    for budget in ["0", "-5"] {
        let out = sandbox.books(&["simulate", "--budget-ms", budget, "1"]);
        assert!(!out.status.success());
        assert!(
            stderr(&out).contains("budget must be positive"),
            "{}",
            stderr(&out)
        );
        assert!(stdout(&out).is_empty());
    }
}

#[test]
fn configured_non_positive_budget_is_rejected() {
    let sandbox = Sandbox::with_config("[simulation]\nbudget_ms = 0\n");
    let out = sandbox.books(&["simulate", "1"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("budget must be positive"));
}

#[test]
fn json_output_carries_rejected_and_outcomes() {
    let sandbox = Sandbox::new();
    sandbox.seed();

    let out = sandbox.books(&["simulate", "--json", "1", "nope", "42"]);
    assert!(out.status.success(), "{}", stderr(&out));

    let value: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(value["rejected"][0]["status"], "invalid_input");
    assert_eq!(value["rejected"][0]["raw_value"], "nope");
    assert_eq!(value["outcomes"][0]["status"], "completed");
    assert_eq!(value["outcomes"][0]["identifier"], 1);
    assert_eq!(value["outcomes"][1]["status"], "not_found");
    assert_eq!(value["outcomes"][1]["identifier"], 42);
}

#[test]
fn logs_stay_out_of_stdout() {
    let sandbox = Sandbox::new();
    sandbox.seed();
    let out = sandbox.books(&["simulate", "1"]);
    assert!(!stdout(&out).contains("INFO"));
}
