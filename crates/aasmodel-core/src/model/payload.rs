use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Domain fields of an element
///
/// The concrete vocabulary of element kinds (property values, value types,
/// file paths, ...) is not modelled by the core; it travels here as JSON
/// values so that backends can fill it and `update_from` can merge it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Payload {
    data: HashMap<String, serde_json::Value>,
}

impl Payload {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<HashMap<String, serde_json::Value>> for Payload {
    fn from(data: HashMap<String, serde_json::Value>) -> Self {
        Self { data }
    }
}

impl From<Payload> for HashMap<String, serde_json::Value> {
    fn from(payload: Payload) -> Self {
        payload.data
    }
}
