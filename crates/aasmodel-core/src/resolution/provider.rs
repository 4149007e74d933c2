use std::collections::HashMap;

use crate::errors::{AasError, Result};
use crate::model::{ElementId, Identifier};
use crate::ops::Model;

/// Lookup of Identifiable elements by their global identifier
pub trait ObjectProvider {
    /// # Errors
    /// * `IdentifiableNotFound` - If no element has this identifier
    fn get_identifiable(&self, model: &Model, identifier: &Identifier) -> Result<ElementId>;
}

/// Provider backed by a map from identifier to element
#[derive(Debug, Clone, Default)]
pub struct DictObjectProvider {
    entries: HashMap<Identifier, ElementId>,
}

impl DictObjectProvider {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register an Identifiable under its identifier
    ///
    /// # Errors
    /// * `InvalidElementKind` - If the element is not Identifiable
    /// * `Collision` - If another element is registered with the same identifier
    pub fn add(&mut self, model: &Model, element: ElementId) -> Result<()> {
        let el = model.get(element)?;
        let identifier = el
            .identification()
            .ok_or_else(|| AasError::InvalidElementKind {
                kind: el.kind().to_string(),
                reason: "only Identifiables can be provided".to_string(),
            })?;
        match self.entries.get(identifier) {
            Some(existing) if *existing != element => Err(AasError::Collision {
                attribute: "identification".to_string(),
                value: identifier.to_string(),
                in_same_set: true,
            }),
            _ => {
                self.entries.insert(identifier.clone(), element);
                Ok(())
            }
        }
    }

    pub fn discard(&mut self, identifier: &Identifier) -> Option<ElementId> {
        self.entries.remove(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ObjectProvider for DictObjectProvider {
    fn get_identifiable(&self, model: &Model, identifier: &Identifier) -> Result<ElementId> {
        self.entries
            .get(identifier)
            .copied()
            .filter(|id| model.contains(*id))
            .ok_or_else(|| AasError::IdentifiableNotFound {
                identifier: identifier.to_string(),
            })
    }
}

/// Every Identifiable of the model is reachable by scanning it
impl ObjectProvider for Model {
    fn get_identifiable(&self, _model: &Model, identifier: &Identifier) -> Result<ElementId> {
        self.list_elements()
            .into_iter()
            .filter(|element| element.identification() == Some(identifier))
            .map(|element| element.id())
            .min()
            .ok_or_else(|| AasError::IdentifiableNotFound {
                identifier: identifier.to_string(),
            })
    }
}
