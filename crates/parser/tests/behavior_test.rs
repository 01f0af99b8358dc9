//! Integration test for behavior model loading

use clientgen_common::BackoffKind;
use clientgen_parser::BehaviorModel;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_behavior_model_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("behavior-model.json");
    fs::write(
        &path,
        r#"{
            "version": "1.0",
            "operations": {
                "GetProject": {
                    "readonly": true,
                    "retry": { "max": 3, "base_delay_seconds": 1, "backoff": "exp+jitter" }
                },
                "CreateTodo": { "retry": { "max": 5 } },
                "TrashProject": { "idempotent": true, "retry": { "max": 0 } }
            }
        }"#,
    )
    .unwrap();

    let model = BehaviorModel::from_file(&path);
    let keys: Vec<_> = model.operations.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["CreateTodo", "GetProject", "TrashProject"]);

    let get = model.get("GetProject").unwrap();
    assert!(get.readonly);
    assert_eq!(get.retry.backoff, BackoffKind::ExponentialJitter);
    assert_eq!(get.retry.base_delay_ms, 1000);

    let create = &model.get("CreateTodo").unwrap().retry;
    assert_eq!(create.max_attempts, 5);
    assert_eq!(create.base_delay_ms, 1000);
    assert_eq!(create.backoff, BackoffKind::Exponential);
    assert_eq!(create.retry_on.iter().copied().collect::<Vec<_>>(), vec![429, 503]);

    let trash = model.get("TrashProject").unwrap();
    assert_eq!(trash.retry.max_attempts, 0);
    assert_eq!(model.idempotent_operations().collect::<Vec<_>>(), vec!["TrashProject"]);
}

#[test]
fn test_truncated_file_yields_empty_model() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("behavior-model.json");
    fs::write(&path, r#"{"operations": {"GetProject": "#).unwrap();

    assert!(BehaviorModel::from_file(&path).is_empty());
}
