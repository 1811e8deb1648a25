//! Configuration store shared by all loaders.
//!
//! The store replaces the CMS's global configuration array. It may be absent
//! or hold a value that is not a mapping; loaders treat both cases as
//! "nothing configured" and leave the store untouched.

use serde_json::Value;

use crate::tree::{self, ConfigTree, PATH_DELIMITER};

/// Explicit configuration context passed into loaders.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigStore {
    vars: Option<Value>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    /// Create a store holding an empty mapping.
    pub fn new() -> Self {
        Self {
            vars: Some(Value::Object(ConfigTree::new())),
        }
    }

    /// Create a store with no configuration at all.
    pub fn absent() -> Self {
        Self { vars: None }
    }

    /// Create a store from an arbitrary value, which need not be a mapping.
    pub fn from_value(value: Value) -> Self {
        Self { vars: Some(value) }
    }

    pub fn from_tree(tree: ConfigTree) -> Self {
        Self::from_value(Value::Object(tree))
    }

    /// The underlying tree, if the store currently holds a mapping.
    pub fn tree(&self) -> Option<&ConfigTree> {
        self.vars.as_ref().and_then(Value::as_object)
    }

    /// Returns true if the store holds a mapping and can be merged into.
    pub fn is_valid(&self) -> bool {
        self.tree().is_some()
    }

    /// Resolve a `/`-delimited path inside the store.
    pub fn value_by_path(&self, path: &str) -> Option<&Value> {
        tree::value_by_path(self.tree()?, path)
    }

    /// Deep-merge `data` into the store.
    ///
    /// Returns false without touching the store if it is absent or not a mapping.
    pub fn merge(&mut self, data: ConfigTree) -> bool {
        match self.vars.as_mut().and_then(Value::as_object_mut) {
            Some(current) => {
                tree::deep_merge(current, data);
                true
            }
            None => false,
        }
    }

    /// Set a value at a `/`-delimited path, creating intermediate mappings.
    ///
    /// Returns false if the store is absent or not a mapping.
    pub fn set_value(&mut self, path: &str, value: Value) -> bool {
        match self.vars.as_mut().and_then(Value::as_object_mut) {
            Some(current) => {
                let segments: Vec<&str> = path.split(PATH_DELIMITER).collect();
                tree::set_value_by_path(current, &segments, value);
                true
            }
            None => false,
        }
    }

    /// Consume the store, returning its raw value.
    pub fn into_value(self) -> Option<Value> {
        self.vars
    }
}
