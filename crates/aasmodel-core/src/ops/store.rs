use std::collections::HashMap;

use crate::errors::{AasError, Result};
use crate::model::{Element, ElementId};

/// In-memory arena owning every element of an object graph
///
/// Elements point at their parent by [`ElementId`]; children are owned by
/// the namespace sets of their parent. Not thread-safe, all mutation goes
/// through `&mut Model`.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub(crate) elements: HashMap<ElementId, Element>,
}

impl Model {
    /// Create a new empty Model
    pub fn new() -> Self {
        Self {
            elements: HashMap::new(),
        }
    }

    /// Get an element by id
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the element doesn't exist (or was disposed).
    pub fn get(&self, id: ElementId) -> Result<&Element> {
        self.elements
            .get(&id)
            .ok_or_else(|| AasError::ElementNotFound {
                element_id: id.to_string(),
            })
    }

    /// Get a mutable reference to an element by id
    ///
    /// Indexed attributes and the parent link are not reachable through the
    /// returned reference; use [`Model::rename`] for those.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the element doesn't exist.
    pub fn get_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.elements
            .get_mut(&id)
            .ok_or_else(|| AasError::ElementNotFound {
                element_id: id.to_string(),
            })
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// List all elements (unordered)
    pub fn list_elements(&self) -> Vec<&Element> {
        self.elements.values().collect()
    }

    /// Elements without a parent, sorted by id (creation order)
    pub fn roots(&self) -> Vec<ElementId> {
        let mut roots: Vec<ElementId> = self
            .elements
            .values()
            .filter(|e| e.parent.is_none())
            .map(|e| e.id)
            .collect();
        roots.sort();
        roots
    }

    pub(crate) fn insert(&mut self, element: Element) -> ElementId {
        let id = element.id;
        self.elements.insert(id, element);
        id
    }

    /// Parent chain of an element, nearest first
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the element or a parent doesn't exist.
    pub fn ancestors(&self, id: ElementId) -> Result<Vec<ElementId>> {
        let mut ancestors = Vec::new();
        let mut current = self.get(id)?.parent;
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self.get(parent)?.parent;
        }
        Ok(ancestors)
    }

    /// Whether `candidate` is `of` or one of its ancestors
    pub(crate) fn is_ancestor_or_self(&self, candidate: ElementId, of: ElementId) -> bool {
        let mut current = Some(of);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.elements.get(&id).and_then(|e| e.parent);
        }
        false
    }

    /// Children of an element across all its sets, set by set in iteration order
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the element doesn't exist.
    pub fn children(&self, id: ElementId) -> Result<Vec<ElementId>> {
        Ok(self
            .get(id)?
            .sets
            .iter()
            .flat_map(|slot| slot.members())
            .collect())
    }

    /// Remove a detached element and everything below it from the arena
    ///
    /// # Errors
    ///
    /// * `ElementNotFound` - If the element doesn't exist
    /// * `StillAttached` - If the element still has a parent
    pub fn dispose(&mut self, id: ElementId) -> Result<()> {
        let element = self.get(id)?;
        if let Some(parent) = element.parent {
            return Err(AasError::StillAttached {
                element_id: id.to_string(),
                parent_id: parent.to_string(),
            });
        }
        self.dispose_subtree(id);
        Ok(())
    }

    pub(crate) fn dispose_subtree(&mut self, id: ElementId) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(element) = self.elements.remove(&current) {
                pending.extend(element.sets.iter().flat_map(|slot| slot.members()));
            }
        }
    }

    /// Human-readable location of an element, e.g. `Property[IRI=urn:sm / coll / temp]`
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the element or a parent doesn't exist.
    pub fn display_path(&self, id: ElementId) -> Result<String> {
        let element = self.get(id)?;
        let mut reversed_path = Vec::new();
        let mut current = Some(element);
        while let Some(item) = current {
            if let Some(identification) = &item.identification {
                reversed_path.push(identification.to_string());
                break;
            }
            match &item.id_short {
                Some(id_short) => reversed_path.push(id_short.clone()),
                None => break,
            }
            current = match item.parent {
                Some(parent) => Some(self.get(parent)?),
                None => None,
            };
        }
        reversed_path.reverse();
        Ok(format!("{}[{}]", element.kind, reversed_path.join(" / ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementKind;

    #[test]
    fn test_new_model() {
        let model = Model::new();
        assert!(model.is_empty());
        assert_eq!(model.roots().len(), 0);
    }

    #[test]
    fn test_insert_and_get() {
        let mut model = Model::new();
        let id = model.insert(Element::new(ElementKind::Property));
        assert_eq!(model.get(id).unwrap().kind(), ElementKind::Property);
        assert_eq!(model.roots(), vec![id]);
    }

    #[test]
    fn test_get_nonexistent() {
        let model = Model::new();
        let result = model.get(ElementId::new());
        assert!(matches!(result, Err(AasError::ElementNotFound { .. })));
    }

    #[test]
    fn test_dispose_detached() {
        let mut model = Model::new();
        let id = model.insert(Element::new(ElementKind::Property));
        model.dispose(id).unwrap();
        assert!(!model.contains(id));
        assert!(model.dispose(id).is_err());
    }
}
