use serde::{Deserialize, Serialize};

use super::key::Key;

/// Ordered list of keys addressing a model element or an external entity
///
/// Immutable; equality and hashing are order-sensitive over the keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    keys: Vec<Key>,
}

impl Reference {
    pub fn new(keys: Vec<Key>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<Key> for Reference {
    fn from(key: Key) -> Self {
        Self { keys: vec![key] }
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<String> = self.keys.iter().map(|k| k.to_string()).collect();
        write!(f, "Reference({})", keys.join(" / "))
    }
}
