use std::path::Path;

use proptest::prelude::*;
use samgraft_core::{Error, StageConfig, merge_stage_config, stage_names};
use serde_json::{Value, json};
use tempfile::TempDir;

fn write_store(dir: &Path, content: &str) {
    std::fs::create_dir_all(dir.join(".chalice")).unwrap();
    std::fs::write(dir.join(".chalice/config.json"), content).unwrap();
}

fn read_store(dir: &Path) -> Value {
    let content = std::fs::read_to_string(dir.join(".chalice/config.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

fn stage_config(value: Value) -> StageConfig {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

// ── Merge ──

#[test]
fn merge_adds_stage_to_empty_stages() {
    let tmp = TempDir::new().unwrap();
    write_store(tmp.path(), r#"{"version": "2.0", "app_name": "orders", "stages": {}}"#);

    merge_stage_config(
        tmp.path(),
        "prod",
        &stage_config(json!({"api_gateway_stage": "v1"})),
    )
    .unwrap();

    let store = read_store(tmp.path());
    assert_eq!(store["stages"]["prod"], json!({"api_gateway_stage": "v1"}));
    assert_eq!(store["version"], "2.0");
    assert_eq!(store["app_name"], "orders");
}

#[test]
fn merge_replaces_existing_stage_entirely() {
    let tmp = TempDir::new().unwrap();
    write_store(
        tmp.path(),
        r#"{"stages": {"prod": {"api_gateway_stage": "old", "lambda_timeout": 30}}}"#,
    );

    merge_stage_config(
        tmp.path(),
        "prod",
        &stage_config(json!({"api_gateway_stage": "v2"})),
    )
    .unwrap();

    let store = read_store(tmp.path());
    assert_eq!(store["stages"]["prod"], json!({"api_gateway_stage": "v2"}));
}

#[test]
fn merge_keeps_other_stages_and_key_order() {
    let tmp = TempDir::new().unwrap();
    write_store(
        tmp.path(),
        r#"{"version": "2.0", "stages": {"dev": {"autogen_policy": false}, "qa": {}}, "app_name": "orders"}"#,
    );

    merge_stage_config(tmp.path(), "prod", &StageConfig::new()).unwrap();

    let store = read_store(tmp.path());
    let keys: Vec<&String> = store.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["version", "stages", "app_name"]);

    let stages: Vec<&String> = store["stages"].as_object().unwrap().keys().collect();
    assert_eq!(stages, ["dev", "qa", "prod"]);
    assert_eq!(store["stages"]["dev"], json!({"autogen_policy": false}));
}

#[test]
fn merge_writes_two_space_indented_json() {
    let tmp = TempDir::new().unwrap();
    write_store(tmp.path(), r#"{"stages": {}}"#);

    merge_stage_config(tmp.path(), "dev", &stage_config(json!({"a": 1}))).unwrap();

    let content = std::fs::read_to_string(tmp.path().join(".chalice/config.json")).unwrap();
    assert_eq!(
        content,
        "{\n  \"stages\": {\n    \"dev\": {\n      \"a\": 1\n    }\n  }\n}"
    );
}

#[test]
fn merge_truncates_leftover_bytes_from_longer_document() {
    let tmp = TempDir::new().unwrap();
    let long_value = "x".repeat(4096);
    write_store(
        tmp.path(),
        &format!(r#"{{"stages": {{"prod": {{"blob": "{long_value}"}}}}}}"#),
    );

    merge_stage_config(tmp.path(), "prod", &StageConfig::new()).unwrap();

    // The file must still parse: nothing of the old, longer document remains.
    let store = read_store(tmp.path());
    assert_eq!(store["stages"]["prod"], json!({}));
}

// ── Failure cases ──

#[test]
fn merge_missing_store_fails_without_creating_it() {
    let tmp = TempDir::new().unwrap();

    let result = merge_stage_config(tmp.path(), "prod", &StageConfig::new());

    assert!(matches!(result, Err(Error::ConfigStoreOpen { .. })));
    assert!(!tmp.path().join(".chalice/config.json").exists());
}

#[test]
fn merge_malformed_store_returns_parse_error() {
    let tmp = TempDir::new().unwrap();
    write_store(tmp.path(), "{\"stages\": ");

    let result = merge_stage_config(tmp.path(), "prod", &StageConfig::new());

    assert!(matches!(result, Err(Error::ConfigStoreParse { .. })));
    // Left as it was.
    let content = std::fs::read_to_string(tmp.path().join(".chalice/config.json")).unwrap();
    assert_eq!(content, "{\"stages\": ");
}

#[test]
fn merge_without_stages_object_fails() {
    let tmp = TempDir::new().unwrap();
    write_store(tmp.path(), r#"{"version": "2.0", "app_name": "orders"}"#);

    let result = merge_stage_config(tmp.path(), "prod", &StageConfig::new());

    assert!(matches!(result, Err(Error::MissingStages { .. })));
}

#[test]
fn merge_with_non_object_stages_fails() {
    let tmp = TempDir::new().unwrap();
    write_store(tmp.path(), r#"{"stages": ["prod"]}"#);

    let result = merge_stage_config(tmp.path(), "prod", &StageConfig::new());

    assert!(matches!(result, Err(Error::MissingStages { .. })));
}

#[test]
fn error_message_names_store_path() {
    let tmp = TempDir::new().unwrap();
    write_store(tmp.path(), r#"{}"#);

    let err = merge_stage_config(tmp.path(), "prod", &StageConfig::new()).unwrap_err();

    assert!(err.to_string().contains(".chalice/config.json"));
}

// ── Stage names ──

#[test]
fn stage_names_lists_stages_in_file_order() {
    let tmp = TempDir::new().unwrap();
    write_store(
        tmp.path(),
        r#"{"stages": {"prod": {}, "dev": {}, "staging": {}}}"#,
    );

    assert_eq!(stage_names(tmp.path()).unwrap(), ["prod", "dev", "staging"]);
}

#[test]
fn stage_names_requires_stages_object() {
    let tmp = TempDir::new().unwrap();
    write_store(tmp.path(), r#"{"app_name": "orders"}"#);

    assert!(matches!(
        stage_names(tmp.path()),
        Err(Error::MissingStages { .. })
    ));
}

// ── Property: merge touches only the target stage ──

fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z0-9 ]{0,12}".prop_map(Value::from),
    ]
}

fn json_object() -> impl Strategy<Value = StageConfig> {
    prop::collection::btree_map("[a-z_]{1,8}", json_leaf(), 0..5)
        .prop_map(|m| m.into_iter().collect())
}

proptest! {
    #[test]
    fn merge_preserves_everything_but_target_stage(
        top_level in prop::collection::btree_map("[a-z_]{1,8}", json_leaf(), 0..4),
        stages in prop::collection::btree_map("[a-z]{1,6}", json_object(), 0..4),
        target in "[a-z]{1,6}",
        config in json_object(),
    ) {
        let tmp = TempDir::new().unwrap();
        let mut store = serde_json::Map::new();
        for (k, v) in &top_level {
            if k != "stages" {
                store.insert(k.clone(), v.clone());
            }
        }
        let stages: StageConfig = stages
            .into_iter()
            .map(|(k, v)| (k, Value::Object(v)))
            .collect();
        store.insert("stages".to_owned(), Value::Object(stages.clone()));
        write_store(tmp.path(), &serde_json::to_string(&store).unwrap());

        merge_stage_config(tmp.path(), &target, &config).unwrap();

        let merged = read_store(tmp.path());
        let merged = merged.as_object().unwrap();
        for (k, v) in &store {
            if k != "stages" {
                prop_assert_eq!(merged.get(k), Some(v));
            }
        }
        prop_assert_eq!(merged.len(), store.len());

        let merged_stages = merged["stages"].as_object().unwrap();
        prop_assert_eq!(&merged_stages[&target], &Value::Object(config.clone()));
        for (name, value) in &stages {
            if name != &target {
                prop_assert_eq!(merged_stages.get(name), Some(value));
            }
        }
    }
}
