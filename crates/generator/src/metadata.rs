//! Retry metadata emission

use crate::swift;
use clientgen_parser::BehaviorModel;
use serde::Serialize;

/// One `RetryConfig` entry in `Metadata.swift`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetryEntry {
    pub operation: String,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    /// Swift enum case of the backoff strategy
    pub backoff: &'static str,
    /// Comma-separated status codes
    pub retry_on: String,
}

/// Retry entries sorted by operation identity
pub fn retry_entries(behaviors: &BehaviorModel) -> Vec<RetryEntry> {
    behaviors
        .operations
        .iter()
        .map(|(operation, behavior)| RetryEntry {
            operation: operation.clone(),
            max_attempts: behavior.retry.max_attempts,
            base_delay_ms: behavior.retry.base_delay_ms,
            backoff: behavior.retry.backoff.as_str(),
            retry_on: behavior
                .retry
                .retry_on
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect()
}

/// Set literal body for `idempotentOperations`
pub fn idempotent_literal(behaviors: &BehaviorModel) -> String {
    behaviors
        .idempotent_operations()
        .map(|id| format!("\"{}\"", swift::string_literal(id)))
        .collect::<Vec<_>>()
        .join(", ")
}
