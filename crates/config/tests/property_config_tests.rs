//! Property-based tests for mapping and flattening.
//!
//! Test coverage:
//! - Scalar mapping: missing paths never write, scalars write their string form.
//! - Containers never produce a variable from the scalar mapper.
//! - Flattening writes exactly one variable per scalar leaf.
//! - Layered merge: the last layer wins for every leaf it provides.

use std::collections::BTreeMap;

use proptest::prelude::*;
use serde_json::{Map, Value, json};

use typo3_config_loader::{
    ConfigStore, ConfigTree, EnvironmentCreator, RecordingEnvironment, tree,
};

/// Keys that are unique after upper-casing and contain no separators.
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 ./:-]{0,16}".prop_map(Value::String),
        any::<i64>().prop_map(|n| json!(n)),
        any::<bool>().prop_map(Value::Bool),
    ]
}

/// Nested mappings up to three levels deep.
fn tree_strategy() -> impl Strategy<Value = Value> {
    let leaf = scalar_strategy();
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop::collection::btree_map(key_strategy(), inner, 1..4)
            .prop_map(|map| Value::Object(map.into_iter().collect()))
    })
}

fn expected_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        _ => unreachable!("not a scalar"),
    }
}

/// Scalar leaves keyed by their expected variable name below `PHP_CMS_BASE`.
fn collect_leaves(value: &Value, env_key: &str, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                collect_leaves(child, &format!("{env_key}_{}", key.to_uppercase()), out);
            }
        }
        scalar => {
            out.insert(env_key.to_string(), expected_string(scalar));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_missing_path_writes_nothing(
        config in prop::collection::btree_map(key_strategy(), scalar_strategy(), 0..4),
        missing in "[A-Z]{3,6}",
    ) {
        let config: ConfigTree = config.into_iter().collect();
        let mut env = RecordingEnvironment::new();

        let key = EnvironmentCreator::new("PHP_", &mut env)
            .map_config_to_environment(&config, &format!("{missing}/b"), "KEY");

        prop_assert!(key.is_none());
        prop_assert!(env.is_empty());
    }

    #[test]
    fn prop_scalar_is_written_as_string(value in scalar_strategy()) {
        let config = json!({"a": {"b": value.clone()}});
        let config = config.as_object().unwrap();
        let mut env = RecordingEnvironment::new();

        let key = EnvironmentCreator::new("PHP_", &mut env)
            .map_config_to_environment(config, "a/b", "KEY");

        let expected = expected_string(&value);
        prop_assert_eq!(key.as_deref(), Some("PHP_KEY"));
        prop_assert_eq!(env.get("PHP_KEY"), Some(expected.as_str()));
        prop_assert_eq!(env.len(), 1);
    }

    #[test]
    fn prop_container_is_never_written(value in tree_strategy().prop_filter("container", Value::is_object)) {
        let config = json!({"a": {"b": value}});
        let config = config.as_object().unwrap();
        let mut env = RecordingEnvironment::new();

        let key = EnvironmentCreator::new("PHP_", &mut env)
            .map_config_to_environment(config, "a/b", "KEY");

        prop_assert!(key.is_none());
        prop_assert!(env.is_empty());
    }

    #[test]
    fn prop_flatten_writes_one_variable_per_leaf(base in tree_strategy().prop_filter("mapping", Value::is_object)) {
        let store = ConfigStore::from_value(json!({"CMS": {"base": base.clone()}}));
        let mut env = RecordingEnvironment::new();

        let written = EnvironmentCreator::new("PHP_", &mut env)
            .create_environment_variables(&store, "CMS/base");

        let mut expected = BTreeMap::new();
        collect_leaves(&base, "PHP_CMS_BASE", &mut expected);

        prop_assert_eq!(written, expected.len());
        prop_assert_eq!(env.into_vars(), expected);
    }

    #[test]
    fn prop_last_layer_wins(
        first in prop::collection::btree_map(key_strategy(), scalar_strategy(), 0..6),
        second in prop::collection::btree_map(key_strategy(), scalar_strategy(), 0..6),
    ) {
        let mut merged = ConfigTree::new();
        tree::deep_merge(&mut merged, wrap(&first));
        tree::deep_merge(&mut merged, wrap(&second));

        for (key, value) in &first {
            let path = format!("CMS/base/{key}");
            let expected = second.get(key).unwrap_or(value);
            prop_assert_eq!(tree::value_by_path(&merged, &path), Some(expected));
        }
        for (key, value) in &second {
            let path = format!("CMS/base/{key}");
            prop_assert_eq!(tree::value_by_path(&merged, &path), Some(value));
        }
    }
}

fn wrap(leaves: &BTreeMap<String, Value>) -> ConfigTree {
    let base: Map<String, Value> = leaves.clone().into_iter().collect();
    let mut cms = Map::new();
    cms.insert("base".to_string(), Value::Object(base));
    let mut root = Map::new();
    root.insert("CMS".to_string(), Value::Object(cms));
    root
}
