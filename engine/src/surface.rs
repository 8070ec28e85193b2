//! Command-surface helpers: turning raw tokens into identifiers.
//!
//! Tokens that are not positive integers never reach the coordinator. They
//! come back as `InvalidInput` outcomes so the caller can warn about them
//! alongside the report.

use books_types::{BookId, SimulationOutcome};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedTokens {
    /// Identifiers to dispatch, in token order, duplicates kept.
    pub identifiers: Vec<BookId>,
    /// One `InvalidInput` per rejected token, in token order.
    pub rejected: Vec<SimulationOutcome>,
}

pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> ParsedTokens {
    let mut parsed = ParsedTokens::default();
    for token in tokens {
        let raw = token.as_ref();
        match raw.parse::<BookId>() {
            Ok(id) => parsed.identifiers.push(id),
            Err(_) => {
                tracing::warn!(token = raw, "Skipping invalid book ID");
                parsed.rejected.push(SimulationOutcome::InvalidInput {
                    raw_value: raw.to_string(),
                });
            }
        }
    }
    parsed
}
