//! Behavior model parsing
//!
//! The behavior document maps operation identities to runtime semantics:
//!
//! ```json
//! {
//!   "operations": {
//!     "GetProject": {
//!       "readonly": true,
//!       "retry": { "max": 5, "base_delay_ms": 500, "backoff": "exp+jitter", "retry_on": [429, 503] }
//!     }
//!   }
//! }
//! ```
//!
//! Every retry field falls back to its own default. A missing or malformed
//! document never aborts generation: the compiled table is simply empty and
//! the generated client uses its baseline policy.

use clientgen_common::{BackoffKind, OperationBehavior, RetryPolicy};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Compiled per-operation behavior, keyed and sorted by operation identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BehaviorModel {
    pub operations: BTreeMap<String, OperationBehavior>,
}

impl BehaviorModel {
    /// Load a behavior document; unreadable files yield an empty model
    pub fn from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path.as_ref()) {
            Ok(content) => Self::from_json(&content),
            Err(e) => {
                warn!(
                    "Failed to read behavior model {}: {}; using baseline retry policy",
                    path.as_ref().display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Parse a behavior document; unparsable JSON yields an empty model
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Value>(json) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                warn!(
                    "Failed to parse behavior model JSON: {}; using baseline retry policy",
                    e
                );
                Self::default()
            }
        }
    }

    pub fn from_value(value: &Value) -> Self {
        Self {
            operations: compile_retry_policies(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn get(&self, operation_id: &str) -> Option<&OperationBehavior> {
        self.operations.get(operation_id)
    }

    /// Identities the document marks as idempotent
    pub fn idempotent_operations(&self) -> impl Iterator<Item = &str> {
        self.operations
            .iter()
            .filter(|(_, b)| b.idempotent)
            .map(|(id, _)| id.as_str())
    }
}

/// Compile the `operations` map of a behavior document
///
/// # Examples
/// ```
/// use clientgen_parser::compile_retry_policies;
///
/// let doc = serde_json::json!({"operations": {"CreateTodo": {"retry": {"max": 5}}}});
/// let policies = compile_retry_policies(&doc);
///
/// let retry = &policies["CreateTodo"].retry;
/// assert_eq!(retry.max_attempts, 5);
/// assert_eq!(retry.base_delay_ms, 1000);
/// ```
pub fn compile_retry_policies(document: &Value) -> BTreeMap<String, OperationBehavior> {
    let Some(operations) = document.get("operations").and_then(Value::as_object) else {
        if !document.is_null() {
            warn!("Behavior model has no operations map; using baseline retry policy");
        }
        return BTreeMap::new();
    };

    operations
        .iter()
        .filter_map(|(id, entry)| {
            if !entry.is_object() {
                debug!("Skipping non-object behavior entry for {}", id);
                return None;
            }
            Some((id.clone(), compile_operation(id, entry)))
        })
        .collect()
}

fn compile_operation(operation_id: &str, entry: &Value) -> OperationBehavior {
    let idempotent = entry
        .get("idempotent")
        .and_then(Value::as_bool)
        .or_else(|| {
            entry
                .get("idempotency")
                .and_then(|i| i.get("supported"))
                .and_then(Value::as_bool)
        })
        .unwrap_or(false);

    OperationBehavior {
        retry: entry
            .get("retry")
            .map(|retry| compile_retry(operation_id, retry))
            .unwrap_or_default(),
        idempotent,
        readonly: entry.get("readonly").and_then(Value::as_bool).unwrap_or(false),
    }
}

fn compile_retry(operation_id: &str, retry: &Value) -> RetryPolicy {
    let mut policy = RetryPolicy::default();

    if let Some(max) = retry.get("max").and_then(Value::as_u64) {
        policy.max_attempts = u32::try_from(max).unwrap_or(u32::MAX);
    }

    if let Some(ms) = retry.get("base_delay_ms").and_then(Value::as_u64) {
        policy.base_delay_ms = ms;
    } else if let Some(seconds) = retry.get("base_delay_seconds").and_then(Value::as_f64) {
        if seconds >= 0.0 {
            policy.base_delay_ms = (seconds * 1000.0).round() as u64;
        }
    }

    if let Some(backoff) = retry.get("backoff").and_then(Value::as_str) {
        policy.backoff = BackoffKind::parse(backoff).unwrap_or_else(|| {
            debug!(
                "Unknown backoff {:?} for {}, using exponential",
                backoff, operation_id
            );
            BackoffKind::Exponential
        });
    }

    if let Some(codes) = retry.get("retry_on").and_then(Value::as_array) {
        let codes: BTreeSet<u16> = codes
            .iter()
            .filter_map(Value::as_u64)
            .filter_map(|code| u16::try_from(code).ok())
            .collect();
        policy.retry_on = codes;
    }

    policy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_only_keeps_other_defaults() {
        let model = BehaviorModel::from_json(r#"{"operations": {"CreateTodo": {"retry": {"max": 5}}}}"#);
        let retry = &model.get("CreateTodo").unwrap().retry;
        assert_eq!(retry.max_attempts, 5);
        assert_eq!(retry.base_delay_ms, 1000);
        assert_eq!(retry.backoff, BackoffKind::Exponential);
        assert_eq!(retry.retry_on.iter().copied().collect::<Vec<_>>(), vec![429, 503]);
    }

    #[test]
    fn test_empty_retry_on_means_no_statuses() {
        let model = BehaviorModel::from_json(
            r#"{"operations": {"CreateTodo": {"retry": {"retry_on": []}}}}"#,
        );
        let retry = &model.get("CreateTodo").unwrap().retry;
        assert!(retry.retry_on.is_empty());
        assert_eq!(retry.max_attempts, 3);
    }

    #[test]
    fn test_full_entry() {
        let model = BehaviorModel::from_json(
            r#"{"operations": {"GetProject": {
                "readonly": true,
                "idempotent": true,
                "retry": {"max": 4, "base_delay_seconds": 1.5, "backoff": "exp+jitter", "retry_on": [500, 429, 70000]}
            }}}"#,
        );
        let behavior = model.get("GetProject").unwrap();
        assert!(behavior.readonly);
        assert!(behavior.idempotent);
        assert_eq!(behavior.retry.max_attempts, 4);
        assert_eq!(behavior.retry.base_delay_ms, 1500);
        assert_eq!(behavior.retry.backoff, BackoffKind::ExponentialJitter);
        assert_eq!(
            behavior.retry.retry_on.iter().copied().collect::<Vec<_>>(),
            vec![429, 500]
        );
    }

    #[test]
    fn test_milliseconds_win_over_seconds() {
        let doc = serde_json::json!({"operations": {"A": {"retry": {
            "base_delay_ms": 250, "base_delay_seconds": 9
        }}}});
        assert_eq!(compile_retry_policies(&doc)["A"].retry.base_delay_ms, 250);
    }

    #[test]
    fn test_unknown_backoff_falls_back() {
        let doc = serde_json::json!({"operations": {"A": {"retry": {"backoff": "fibonacci"}}}});
        assert_eq!(
            compile_retry_policies(&doc)["A"].retry.backoff,
            BackoffKind::Exponential
        );
    }

    #[test]
    fn test_idempotency_trait_form() {
        let doc = serde_json::json!({"operations": {"A": {"idempotency": {"supported": true}}}});
        let behavior = &compile_retry_policies(&doc)["A"];
        assert!(behavior.idempotent);
        assert_eq!(behavior.retry, RetryPolicy::default());
    }

    #[test]
    fn test_malformed_documents_are_empty() {
        assert!(BehaviorModel::from_json("not json").is_empty());
        assert!(BehaviorModel::from_json(r#"{"operations": []}"#).is_empty());
        assert!(BehaviorModel::from_json(r#"{"version": 1}"#).is_empty());
        assert!(BehaviorModel::from_file("/nonexistent/behavior.json").is_empty());

        let model = BehaviorModel::from_json(r#"{"operations": {"A": 3, "B": {}}}"#);
        assert_eq!(model.operations.keys().collect::<Vec<_>>(), vec!["B"]);
    }

    #[test]
    fn test_entries_sorted_by_identity() {
        let model = BehaviorModel::from_json(
            r#"{"operations": {"UpdateTodo": {"idempotent": true}, "CreateTodo": {}, "GetTodo": {"idempotent": true}}}"#,
        );
        let keys: Vec<_> = model.operations.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["CreateTodo", "GetTodo", "UpdateTodo"]);
        assert_eq!(
            model.idempotent_operations().collect::<Vec<_>>(),
            vec!["GetTodo", "UpdateTodo"]
        );
    }
}
