use serde::{Deserialize, Serialize};

use super::reference::Reference;
use crate::errors::{AasError, Result};

/// Version information of an Identifiable element
///
/// *Constraint AASd-005:* a revision requires a version.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdministrativeInformation {
    version: Option<String>,
    revision: Option<String>,
}

impl AdministrativeInformation {
    /// # Errors
    /// * `EmptyValue` - If version or revision is an empty string
    /// * `ConstraintViolation` (5) - If a revision is given without a version
    pub fn new(version: Option<String>, revision: Option<String>) -> Result<Self> {
        if version.as_deref() == Some("") {
            return Err(AasError::EmptyValue {
                field: "version".to_string(),
            });
        }
        if revision.as_deref() == Some("") {
            return Err(AasError::EmptyValue {
                field: "revision".to_string(),
            });
        }
        if version.is_none() && revision.is_some() {
            return Err(AasError::constraint(
                5,
                "A revision requires a version. This means, if there is no version there is no revision neither",
            ));
        }
        Ok(Self { version, revision })
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }
}

/// A generic identifier as key-value pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentifierKeyValuePair {
    key: String,
    value: String,
    external_subject_id: Reference,
    semantic_id: Option<Reference>,
}

impl IdentifierKeyValuePair {
    /// # Errors
    /// * `EmptyValue` - If key or value is empty
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        external_subject_id: Reference,
        semantic_id: Option<Reference>,
    ) -> Result<Self> {
        let key = key.into();
        let value = value.into();
        if key.is_empty() {
            return Err(AasError::EmptyValue {
                field: "key".to_string(),
            });
        }
        if value.is_empty() {
            return Err(AasError::EmptyValue {
                field: "value".to_string(),
            });
        }
        Ok(Self {
            key,
            value,
            external_subject_id,
            semantic_id,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn external_subject_id(&self) -> &Reference {
        &self.external_subject_id
    }

    pub fn semantic_id(&self) -> Option<&Reference> {
        self.semantic_id.as_ref()
    }
}
